/*
 * Responsibility
 * - Per-request authorization bag handed to every field resolution
 * - Read-only after construction; cheap to clone (Arc inside)
 */
use std::net::IpAddr;
use std::sync::Arc;

use axum::http::{Method, Uri};
use thiserror::Error;

use crate::services::auth::identity::Identity;
use crate::services::authz::decider::AuthorizationDecider;
use crate::services::authz::username_voter::USERNAME_ACCESS_ROLE;
use crate::services::authz::voter::{Subject, UsernameAuthorization};

pub const OTHER_USER_DENIED: &str = "Access to another user's data denied";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct AccessDenied(pub String);

/// What the context remembers about the originating request.
#[derive(Debug, Clone, Default)]
pub struct RequestRef {
    pub method: Method,
    pub uri: Uri,
    pub request_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AuthorizationContext {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    decider: Arc<AuthorizationDecider>,
    identity: Arc<Identity>,
    admin_role: String,
    client_ip: Option<IpAddr>,
    request: RequestRef,
}

impl AuthorizationContext {
    pub fn new(
        decider: Arc<AuthorizationDecider>,
        identity: Arc<Identity>,
        admin_role: impl Into<String>,
        client_ip: Option<IpAddr>,
        request: RequestRef,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                decider,
                identity,
                admin_role: admin_role.into(),
                client_ip,
                request,
            }),
        }
    }

    pub fn decider(&self) -> &AuthorizationDecider {
        &self.inner.decider
    }

    pub fn identity(&self) -> &Identity {
        &self.inner.identity
    }

    pub fn admin_role(&self) -> &str {
        &self.inner.admin_role
    }

    pub fn client_ip(&self) -> Option<IpAddr> {
        self.inner.client_ip
    }

    pub fn request(&self) -> &RequestRef {
        &self.inner.request
    }

    pub fn is_granted(&self, attributes: &[&str], subject: Option<&Subject>) -> bool {
        self.inner
            .decider
            .is_granted(&self.inner.identity, attributes, subject)
    }

    pub fn assert_granted(
        &self,
        attributes: &[&str],
        subject: Option<&Subject>,
        denied_message: &str,
    ) -> Result<(), AccessDenied> {
        if self.is_granted(attributes, subject) {
            return Ok(());
        }

        tracing::info!(
            username = %self.identity().username(),
            ?attributes,
            client_ip = ?self.client_ip(),
            "access denied"
        );
        Err(AccessDenied(denied_message.to_string()))
    }

    /// Owner or admin.
    pub fn assert_same_username(&self, username: &str) -> Result<(), AccessDenied> {
        let subject = Subject::Username(UsernameAuthorization::new(username));
        self.assert_granted(
            &[USERNAME_ACCESS_ROLE, self.admin_role()],
            Some(&subject),
            OTHER_USER_DENIED,
        )
    }
}
