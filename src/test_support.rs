//! Token fixtures shared by unit tests.
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde_json::Value;

use crate::services::auth::claims::RawToken;

pub const RS256_PRIVATE_PEM: &str = include_str!("../tests/fixtures/rs256_private.pem");
pub const RS256_PUBLIC_PEM: &str = include_str!("../tests/fixtures/rs256_public.pem");
pub const OTHER_PUBLIC_PEM: &str = include_str!("../tests/fixtures/other_public.pem");

pub fn sign_rs256(claims: &Value) -> RawToken {
    let key = EncodingKey::from_rsa_pem(RS256_PRIVATE_PEM.as_bytes()).unwrap();
    let token = jsonwebtoken::encode(&Header::new(Algorithm::RS256), claims, &key).unwrap();
    RawToken::new(token)
}

/// Same header and payload, different signature bytes.
pub fn tamper(token: &RawToken) -> RawToken {
    let (signed, signature) = token.as_str().rsplit_once('.').unwrap();
    let mut bytes = URL_SAFE_NO_PAD.decode(signature).unwrap();
    let mid = bytes.len() / 2;
    bytes[mid] ^= 0xff;
    RawToken::new(format!("{signed}.{}", URL_SAFE_NO_PAD.encode(bytes)))
}
