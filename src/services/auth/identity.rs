use std::collections::BTreeSet;
use std::sync::{Arc, PoisonError, RwLock};

use crate::services::auth::claims::RawToken;

pub const ANONYMOUS_USER: &str = "anonymous";

/// The caller of one request. Immutable once published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    username: String,
    raw_credential: Option<RawToken>,
    roles: BTreeSet<String>,
    authenticated: bool,
}

impl Identity {
    /// Identity used when no token is checked. Counts as authenticated.
    pub fn anonymous(roles: BTreeSet<String>) -> Self {
        Self {
            username: ANONYMOUS_USER.to_string(),
            raw_credential: None,
            roles,
            authenticated: true,
        }
    }

    pub fn authenticated(username: impl Into<String>, credential: RawToken, roles: BTreeSet<String>) -> Self {
        Self {
            username: username.into(),
            raw_credential: Some(credential),
            roles,
            authenticated: true,
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn raw_credential(&self) -> Option<&RawToken> {
        self.raw_credential.as_ref()
    }

    pub fn roles(&self) -> &BTreeSet<String> {
        &self.roles
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// The anonymous user with no credentials attached.
    pub fn is_anonymous(&self) -> bool {
        self.username == ANONYMOUS_USER && self.raw_credential.is_none()
    }
}

/// Request-scoped slot holding the active identity.
///
/// Publishing replaces the whole value; readers get a shared snapshot.
#[derive(Debug, Default)]
pub struct IdentityStorage {
    current: RwLock<Option<Arc<Identity>>>,
}

impl IdentityStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, identity: Identity) -> Arc<Identity> {
        let identity = Arc::new(identity);
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(identity.clone());
        identity
    }

    pub fn current(&self) -> Option<Arc<Identity>> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
