use thiserror::Error;

use crate::repos::error::RepoError;
use crate::services::authz::context::AccessDenied;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error(transparent)]
    AccessDenied(#[from] AccessDenied),
    // Field misconfiguration; never a data problem.
    #[error("Unsupported conversion: {0}")]
    UnsupportedConversion(String),
    #[error("invalid value: {0}")]
    InvalidValue(String),
    #[error("data store failure")]
    Store(#[from] RepoError),
}
