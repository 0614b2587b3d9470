use thiserror::Error;

use crate::repos::error::RepoError;
use crate::services::auth::keys::KeyError;

/// Failures of the token pipeline (extract -> decode -> key -> verify -> user).
///
/// These carry internal detail for logs. Callers outside the pipeline only see
/// `AuthenticationFailed` and its opaque public message.
#[derive(Debug, Error)]
pub enum AuthError {
    // No credential supplied at all. Kept distinct so callers can fall back to anonymous.
    #[error("no token supplied")]
    OmittedToken,
    #[error("malformed authorization header: {0}")]
    MalformedHeader(&'static str),
    #[error("malformed token: {0}")]
    MalformedToken(&'static str),
    #[error("missing '{0}' claim")]
    MissingClaim(String),
    // Every verification error collapses here.
    #[error("token signature verification failed")]
    InvalidSignature,
    #[error("verification key unavailable: {0}")]
    Key(#[from] KeyError),
    #[error("user {0:?} could not be found after provisioning")]
    ProvisioningFailed(String),
    #[error("user row is malformed: {0}")]
    MalformedUser(&'static str),
    #[error("user store failure: {0}")]
    Store(#[from] RepoError),
}

/// The single failure mode of identity establishment.
#[derive(Debug, Error)]
#[error("{}", public_message(.cause))]
pub struct AuthenticationFailed {
    #[from]
    cause: AuthError,
}

fn public_message(cause: &AuthError) -> &'static str {
    match cause {
        AuthError::OmittedToken => "Token required",
        _ => "Token invalid",
    }
}

impl AuthenticationFailed {
    pub fn cause(&self) -> &AuthError {
        &self.cause
    }

    /// Message safe to show to the caller.
    pub fn public_message(&self) -> &'static str {
        public_message(&self.cause)
    }
}
