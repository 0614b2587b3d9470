/*
 * Responsibility
 * - One call per request: establish the caller identity and publish it
 * - No provider means JWT is disabled -> anonymous identity (admin role only when explicitly enabled)
 * - Any pipeline failure -> AuthenticationFailed, identity never published
 */
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::services::auth::claims::ClaimSettings;
use crate::services::auth::error::{AuthError, AuthenticationFailed};
use crate::services::auth::extractor::TokenExtractor;
use crate::services::auth::identity::{Identity, IdentityStorage};
use crate::services::auth::provider::JwtAuthProvider;
use crate::services::auth::request::InboundRequest;

pub const DEFAULT_ADMIN_ROLE: &str = "ROLE_ADMIN";

#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub claims: ClaimSettings,
    pub admin_role: String,
    // JWT disabled: give the anonymous identity the admin role.
    pub anonymous_admin: bool,
    // JWT enabled: a request without any token becomes anonymous.
    pub anonymous_on_omitted_token: bool,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            claims: ClaimSettings::default(),
            admin_role: DEFAULT_ADMIN_ROLE.to_string(),
            anonymous_admin: false,
            anonymous_on_omitted_token: false,
        }
    }
}

/// Whether tokens are checked is decided by the presence of a provider alone.
#[derive(Clone)]
pub struct IdentityFacade {
    extractor: TokenExtractor,
    provider: Option<JwtAuthProvider>,
}

impl IdentityFacade {
    pub fn new(extractor: TokenExtractor, provider: Option<JwtAuthProvider>) -> Self {
        Self {
            extractor,
            provider,
        }
    }

    /// Facade that never checks tokens.
    pub fn disabled() -> Self {
        Self::new(TokenExtractor::default(), None)
    }

    pub fn is_enabled(&self) -> bool {
        self.provider.is_some()
    }

    pub async fn initialize(
        &self,
        request: &InboundRequest,
        settings: &AuthSettings,
        storage: &IdentityStorage,
    ) -> Result<Arc<Identity>, AuthenticationFailed> {
        let identity = match self.establish(request, settings).await {
            Ok(identity) => identity,
            Err(err) => {
                tracing::warn!(
                    error = ?err,
                    method = %request.method(),
                    path = %request.uri().path(),
                    "authentication failed"
                );
                return Err(err.into());
            }
        };

        Ok(storage.publish(identity))
    }

    async fn establish(&self, request: &InboundRequest, settings: &AuthSettings) -> Result<Identity, AuthError> {
        let provider = match &self.provider {
            Some(provider) => provider,
            None => {
                let roles = if settings.anonymous_admin {
                    BTreeSet::from([settings.admin_role.clone()])
                } else {
                    BTreeSet::new()
                };
                return Ok(Identity::anonymous(roles));
            }
        };

        let token = match self.extractor.extract(request) {
            Ok(token) => token,
            Err(AuthError::OmittedToken) if settings.anonymous_on_omitted_token => {
                tracing::debug!("no token supplied, continuing as anonymous");
                return Ok(Identity::anonymous(BTreeSet::new()));
            }
            Err(err) => return Err(err),
        };

        provider.authenticate(token, &settings.claims).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repos::memory_store::MemoryStore;
    use crate::services::auth::identity::ANONYMOUS_USER;
    use crate::services::auth::keys::{KeyMaterial, StaticKeyResolver};
    use crate::services::auth::user_provider::{DefaultDataMapper, UserResolver};
    use crate::services::auth::verifier::SignatureVerifier;
    use crate::test_support::{RS256_PUBLIC_PEM, sign_rs256, tamper};
    use axum::http::{HeaderMap, HeaderValue, Method, Uri};
    use serde_json::json;

    fn facade(store: Arc<MemoryStore>) -> IdentityFacade {
        let provider = JwtAuthProvider::new(
            Arc::new(StaticKeyResolver::new(KeyMaterial::new(RS256_PUBLIC_PEM))),
            SignatureVerifier::default(),
            UserResolver::new(store, Arc::new(DefaultDataMapper::default())),
        );
        IdentityFacade::new(TokenExtractor::default(), Some(provider))
    }

    fn request(bearer: Option<&str>) -> InboundRequest {
        let mut headers = HeaderMap::new();
        if let Some(token) = bearer {
            headers.insert(
                "x-authorization",
                HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
            );
        }
        InboundRequest::new(Method::POST, Uri::from_static("/graphql"), headers)
    }

    #[tokio::test]
    async fn test_valid_token_publishes_identity() {
        let store = Arc::new(MemoryStore::new());
        let storage = IdentityStorage::new();
        let token = sign_rs256(&json!({"username": "alice", "roles": ["ROLE_USER"]}));

        let identity = facade(store)
            .initialize(&request(Some(token.as_str())), &AuthSettings::default(), &storage)
            .await
            .unwrap();

        assert_eq!(identity.username(), "alice");
        assert!(Arc::ptr_eq(&identity, &storage.current().unwrap()));
    }

    #[tokio::test]
    async fn test_invalid_token_is_never_published() {
        let store = Arc::new(MemoryStore::new());
        let storage = IdentityStorage::new();
        let token = tamper(&sign_rs256(&json!({"username": "alice"})));

        let err = facade(store.clone())
            .initialize(&request(Some(token.as_str())), &AuthSettings::default(), &storage)
            .await
            .unwrap_err();

        assert!(matches!(err.cause(), AuthError::InvalidSignature));
        assert_eq!(err.to_string(), "Token invalid");
        assert!(storage.current().is_none());
        assert_eq!(store.call_count(), 0);
    }

    #[tokio::test]
    async fn test_omitted_token() {
        let storage = IdentityStorage::new();
        let f = facade(Arc::new(MemoryStore::new()));

        let err = f
            .initialize(&request(None), &AuthSettings::default(), &storage)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Token required");
        assert!(storage.current().is_none());

        let settings = AuthSettings {
            anonymous_on_omitted_token: true,
            ..AuthSettings::default()
        };
        let identity = f.initialize(&request(None), &settings, &storage).await.unwrap();
        assert!(identity.is_anonymous());
        assert!(identity.roles().is_empty());
    }

    #[tokio::test]
    async fn test_anonymous_on_omitted_token_does_not_excuse_bad_tokens() {
        let settings = AuthSettings {
            anonymous_on_omitted_token: true,
            ..AuthSettings::default()
        };

        let err = facade(Arc::new(MemoryStore::new()))
            .initialize(&request(Some("garbage")), &settings, &IdentityStorage::new())
            .await
            .unwrap_err();
        assert!(matches!(err.cause(), AuthError::MalformedToken(_)));
    }

    #[tokio::test]
    async fn test_disabled_jwt_yields_anonymous_without_roles() {
        let facade = IdentityFacade::disabled();
        assert!(!facade.is_enabled());

        let identity = facade
            .initialize(&request(Some("ignored")), &AuthSettings::default(), &IdentityStorage::new())
            .await
            .unwrap();

        assert_eq!(identity.username(), ANONYMOUS_USER);
        assert!(identity.is_authenticated());
        assert!(identity.roles().is_empty());
    }

    #[tokio::test]
    async fn test_anonymous_admin_never_bypasses_an_enabled_facade() {
        let store = Arc::new(MemoryStore::new());
        let settings = AuthSettings {
            anonymous_admin: true,
            ..AuthSettings::default()
        };
        let facade = facade(store.clone());
        assert!(facade.is_enabled());

        let err = facade
            .initialize(&request(None), &settings, &IdentityStorage::new())
            .await
            .unwrap_err();

        assert!(matches!(err.cause(), AuthError::OmittedToken));
        assert_eq!(store.call_count(), 0);
    }

    #[tokio::test]
    async fn test_disabled_jwt_with_anonymous_admin() {
        let settings = AuthSettings {
            anonymous_admin: true,
            ..AuthSettings::default()
        };

        let identity = IdentityFacade::disabled()
            .initialize(&request(None), &settings, &IdentityStorage::new())
            .await
            .unwrap();

        assert!(identity.has_role(DEFAULT_ADMIN_ROLE));
    }
}
