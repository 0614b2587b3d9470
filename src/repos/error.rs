/*
 * Responsibility
 * - What the data store layer reports upward
 * - Callers decide whether a store failure is an auth failure or a resolver failure
 */
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("db error")]
    Db(#[from] sqlx::Error),
    #[error("invalid identifier: {0:?}")]
    InvalidIdentifier(String),
    #[error("row is not a json object")]
    MalformedRow,
}

pub type RepoResult<T> = Result<T, RepoError>;
