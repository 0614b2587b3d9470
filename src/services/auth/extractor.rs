//! Pulls the raw bearer token out of an inbound request.
//!
//! The header defaults to `X-Authorization` rather than `Authorization` because
//! some reverse proxies strip the standard header. When the header is absent the
//! `jwt` query parameter is used.

use crate::services::auth::claims::RawToken;
use crate::services::auth::error::AuthError;
use crate::services::auth::request::InboundRequest;

pub const DEFAULT_TOKEN_HEADER: &str = "X-Authorization";
pub const TOKEN_QUERY_PARAM: &str = "jwt";

#[derive(Debug, Clone)]
pub struct TokenExtractor {
    header: String,
}

impl Default for TokenExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_TOKEN_HEADER)
    }
}

impl TokenExtractor {
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
        }
    }

    pub fn header(&self) -> &str {
        &self.header
    }

    pub fn extract(&self, request: &InboundRequest) -> Result<RawToken, AuthError> {
        if let Some(value) = request.headers().get(self.header.as_str()) {
            let value = value
                .to_str()
                .map_err(|_| AuthError::MalformedHeader("invalid authorization header"))?;

            let parts: Vec<&str> = value.split(' ').collect();
            if parts.len() != 2 {
                return Err(AuthError::MalformedHeader("invalid authorization header"));
            }
            if parts[0] != "Bearer" {
                return Err(AuthError::MalformedHeader("invalid authorization type"));
            }

            return Ok(RawToken::new(parts[1]));
        }

        match request.query_param(TOKEN_QUERY_PARAM) {
            Some(jwt) if !jwt.is_empty() => Ok(RawToken::new(jwt)),
            _ => Err(AuthError::OmittedToken),
        }
    }
}
