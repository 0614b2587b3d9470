use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde_json::{Map, Value};

use crate::services::auth::claims::{ClaimSettings, Claims, RawToken};
use crate::services::auth::error::AuthError;

/// A structurally valid token whose claims have been read but not verified.
#[derive(Debug, Clone)]
pub struct UnverifiedToken {
    pub raw: RawToken,
    pub claims: Claims,
}

/// Reads claims before the signature is checked so the username can pick the key.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenDecoder;

impl TokenDecoder {
    pub fn decode(&self, raw: RawToken, settings: &ClaimSettings) -> Result<UnverifiedToken, AuthError> {
        let segments: Vec<&str> = raw.as_str().split('.').collect();
        if segments.len() != 3 {
            return Err(AuthError::MalformedToken("wrong number of segments"));
        }

        let bytes = URL_SAFE_NO_PAD
            .decode(segments[1].trim_end_matches('='))
            .map_err(|_| AuthError::MalformedToken("payload is not base64url"))?;

        let payload: Map<String, Value> = serde_json::from_slice(&bytes)
            .map_err(|_| AuthError::MalformedToken("payload is not a JSON object"))?;

        let claims = Claims::from_payload(payload, settings)?;

        Ok(UnverifiedToken { raw, claims })
    }
}
