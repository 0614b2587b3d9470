use axum::extract::FromRequestParts;
use axum::http::{StatusCode, request::Parts};

use crate::services::authz::context::AuthorizationContext;
use crate::state::AppState;

/// Missing context means the route is not behind the identity middleware;
/// answer 401 rather than run unauthenticated.
pub struct AuthContext(pub AuthorizationContext);

impl FromRequestParts<AppState> for AuthContext {
    type Rejection = StatusCode;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthorizationContext>()
            .cloned()
            .map(AuthContext)
            .ok_or(StatusCode::UNAUTHORIZED)
    }
}
