use std::fmt;

use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde_json::{Map, Value};

use crate::services::auth::claims::{ClaimSettings, Claims, RawToken};
use crate::services::auth::error::AuthError;
use crate::services::auth::keys::{KeyError, KeyMaterial};

/// Signature check against a resolved key with one fixed algorithm.
///
/// - `exp`/`nbf` are validated when present but not required.
/// - `aud` is not checked; tokens here are not audience-scoped.
/// - Every jsonwebtoken error becomes `AuthError::InvalidSignature`.
#[derive(Clone)]
pub struct SignatureVerifier {
    algorithm: Algorithm,
    validation: Validation,
}

impl fmt::Debug for SignatureVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignatureVerifier")
            .field("algorithm", &self.algorithm)
            .finish()
    }
}

impl Default for SignatureVerifier {
    fn default() -> Self {
        Self::new(Algorithm::RS256)
    }
}

impl SignatureVerifier {
    pub fn new(algorithm: Algorithm) -> Self {
        let mut validation = Validation::new(algorithm);
        validation.required_spec_claims.clear();
        validation.validate_aud = false;

        Self {
            algorithm,
            validation,
        }
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    fn decoding_key(&self, key: &KeyMaterial) -> Result<DecodingKey, KeyError> {
        let parsed = match self.algorithm {
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => {
                return Ok(DecodingKey::from_secret(key.as_bytes()));
            }
            Algorithm::RS256
            | Algorithm::RS384
            | Algorithm::RS512
            | Algorithm::PS256
            | Algorithm::PS384
            | Algorithm::PS512 => DecodingKey::from_rsa_pem(key.as_bytes()),
            Algorithm::ES256 | Algorithm::ES384 => DecodingKey::from_ec_pem(key.as_bytes()),
            _ => DecodingKey::from_ed_pem(key.as_bytes()),
        };

        parsed.map_err(|err| {
            tracing::error!(error = ?err, algorithm = ?self.algorithm, "verification key is not usable");
            KeyError::Unavailable(format!("key does not match algorithm {:?}", self.algorithm))
        })
    }

    /// Verify and re-read the claims from the verified payload.
    pub fn verify(
        &self,
        token: &RawToken,
        key: &KeyMaterial,
        settings: &ClaimSettings,
    ) -> Result<Claims, AuthError> {
        let decoding_key = self.decoding_key(key)?;

        let data = jsonwebtoken::decode::<Map<String, Value>>(
            token.as_str(),
            &decoding_key,
            &self.validation,
        )
        .map_err(|err| {
            tracing::debug!(error = ?err, "jwt verification failed");
            AuthError::InvalidSignature
        })?;

        Claims::from_payload(data.claims, settings)
    }
}
