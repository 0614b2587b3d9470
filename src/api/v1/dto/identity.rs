use serde::Serialize;

use crate::services::authz::context::AuthorizationContext;

/// The established caller. The raw credential is never echoed back.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityResponse {
    pub username: String,
    pub roles: Vec<String>,
    pub authenticated: bool,
    pub anonymous: bool,
    pub admin: bool,
    pub client_ip: Option<String>,
    pub request_id: Option<String>,
}

impl From<&AuthorizationContext> for IdentityResponse {
    fn from(ctx: &AuthorizationContext) -> Self {
        let identity = ctx.identity();
        Self {
            username: identity.username().to_string(),
            roles: identity.roles().iter().cloned().collect(),
            authenticated: identity.is_authenticated(),
            anonymous: identity.is_anonymous(),
            admin: ctx.is_granted(&[ctx.admin_role()], None),
            client_ip: ctx.client_ip().map(|ip| ip.to_string()),
            request_id: ctx.request().request_id.clone(),
        }
    }
}
