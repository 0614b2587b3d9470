/*
 * Responsibility
 * - Map a verified username to a persisted user row
 * - Auto-provision the row on first sight, restricted to the mapper's insertable columns
 * - Never delete or update users
 */
use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use serde_json::{Value, json};

use crate::repos::store::{DataStore, Row};
use crate::services::auth::error::AuthError;

pub const DEFAULT_USER_TABLE: &str = "user_data";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub identifier: String,
    pub display_name: String,
    pub roles: BTreeSet<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Describes how users are laid out in the store.
pub trait DataMapper: Send + Sync {
    fn user_table(&self) -> &str;

    fn username_column(&self) -> &str;

    /// Columns a provisioning insert may write.
    fn insert_columns(&self) -> &[&'static str];

    /// Values written when a user is first seen, before column filtering.
    fn provisioning_values(&self, username: &str, now: DateTime<Utc>) -> Row;

    fn map(&self, row: &Row) -> Result<User, AuthError>;
}

/// `username`, `display_name`, `created_at`, optional `roles`.
#[derive(Debug, Clone)]
pub struct DefaultDataMapper {
    table: String,
}

impl Default for DefaultDataMapper {
    fn default() -> Self {
        Self::new(DEFAULT_USER_TABLE)
    }
}

impl DefaultDataMapper {
    const INSERT_COLUMNS: [&'static str; 3] = ["username", "display_name", "created_at"];

    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
        }
    }
}

impl DataMapper for DefaultDataMapper {
    fn user_table(&self) -> &str {
        &self.table
    }

    fn username_column(&self) -> &str {
        "username"
    }

    fn insert_columns(&self) -> &[&'static str] {
        &Self::INSERT_COLUMNS
    }

    fn provisioning_values(&self, username: &str, now: DateTime<Utc>) -> Row {
        let mut values = Row::new();
        values.insert("username".into(), json!(username));
        values.insert("display_name".into(), json!(username));
        values.insert("created_at".into(), json!(now.to_rfc3339()));
        // Roles are never stored on provisioning; filtered out by insert_columns.
        values.insert("roles".into(), Value::Null);
        values
    }

    fn map(&self, row: &Row) -> Result<User, AuthError> {
        let identifier = match row.get("username") {
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            _ => return Err(AuthError::MalformedUser("username is missing")),
        };

        let display_name = row
            .get("display_name")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .unwrap_or(&identifier)
            .to_string();

        let roles = match row.get("roles") {
            Some(Value::String(s)) => s
                .split(',')
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .map(str::to_string)
                .collect(),
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
            _ => BTreeSet::new(),
        };

        Ok(User {
            identifier,
            display_name,
            roles,
            created_at: row.get("created_at").and_then(parse_timestamp),
        })
    }
}

// Unix seconds or an RFC 3339 string.
fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => n.as_i64().and_then(|s| Utc.timestamp_opt(s, 0).single()),
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .ok(),
        _ => None,
    }
}

#[derive(Clone)]
pub struct UserResolver {
    store: Arc<dyn DataStore>,
    mapper: Arc<dyn DataMapper>,
}

impl UserResolver {
    pub fn new(store: Arc<dyn DataStore>, mapper: Arc<dyn DataMapper>) -> Self {
        Self { store, mapper }
    }

    pub async fn load_user(&self, username: &str) -> Result<User, AuthError> {
        let table = self.mapper.user_table();
        let column = self.mapper.username_column();
        let key = Value::String(username.to_string());

        if let Some(row) = self.store.find_one_by(table, column, &key).await? {
            return self.mapper.map(&row);
        }

        let insertable = self.mapper.insert_columns();
        let values: Row = self
            .mapper
            .provisioning_values(username, Utc::now())
            .into_iter()
            .filter(|(col, _)| insertable.contains(&col.as_str()))
            .collect();

        self.store.insert(table, values).await?;
        tracing::info!(
            username = %username,
            table = %table,
            backend = self.store.backend_name(),
            "provisioned user from token"
        );

        match self.store.find_one_by(table, column, &key).await? {
            Some(row) => self.mapper.map(&row),
            None => {
                tracing::error!(username = %username, table = %table, "user missing after insert");
                Err(AuthError::ProvisioningFailed(username.to_string()))
            }
        }
    }
}
