use std::sync::Arc;

use crate::services::auth::claims::{ClaimSettings, RawToken};
use crate::services::auth::decoder::TokenDecoder;
use crate::services::auth::error::AuthError;
use crate::services::auth::identity::Identity;
use crate::services::auth::keys::CertificateResolver;
use crate::services::auth::user_provider::UserResolver;
use crate::services::auth::verifier::SignatureVerifier;

/// Decode -> key lookup -> verify -> load user.
///
/// The username read from the unverified payload only selects the key; the
/// identity is built from the verified claims.
#[derive(Clone)]
pub struct JwtAuthProvider {
    decoder: TokenDecoder,
    keys: Arc<dyn CertificateResolver>,
    verifier: SignatureVerifier,
    users: UserResolver,
}

impl JwtAuthProvider {
    pub fn new(keys: Arc<dyn CertificateResolver>, verifier: SignatureVerifier, users: UserResolver) -> Self {
        Self {
            decoder: TokenDecoder,
            keys,
            verifier,
            users,
        }
    }

    pub async fn authenticate(&self, token: RawToken, settings: &ClaimSettings) -> Result<Identity, AuthError> {
        let unverified = self.decoder.decode(token, settings)?;
        let key = self.keys.verification_key(&unverified.claims.username)?;
        let claims = self.verifier.verify(&unverified.raw, &key, settings)?;

        let user = self.users.load_user(&claims.username).await?;
        tracing::debug!(username = %user.identifier, roles = ?claims.roles, "token verified");

        Ok(Identity::authenticated(user.identifier, unverified.raw, claims.roles))
    }
}
