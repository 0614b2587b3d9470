//! Data store capability shared by user provisioning and relation lookups.
//!
//! Rows travel as JSON objects so the same capability serves arbitrary tables.
use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::repos::error::{RepoError, RepoResult};

/// One table row, keyed by column name.
pub type Row = Map<String, Value>;

/// Minimal table access used by this crate.
///
/// Implementations must be safe to share across concurrent resolver calls
/// (typically a pool or a lock inside).
#[async_trait]
pub trait DataStore: Send + Sync {
    // Backend name (for logging).
    fn backend_name(&self) -> &'static str;

    // First row whose `column` equals `value`.
    async fn find_one_by(&self, table: &str, column: &str, value: &Value)
    -> RepoResult<Option<Row>>;

    // Every row whose `column` equals `value`.
    async fn find_all_by(&self, table: &str, column: &str, value: &Value) -> RepoResult<Vec<Row>>;

    // Insert one row. Returns the number of inserted rows.
    async fn insert(&self, table: &str, values: Row) -> RepoResult<u64>;
}

/// Text form of a scalar used for column comparison.
///
/// `Null` never matches anything.
pub fn match_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}

pub fn into_row(value: Value) -> RepoResult<Row> {
    match value {
        Value::Object(row) => Ok(row),
        _ => Err(RepoError::MalformedRow),
    }
}
