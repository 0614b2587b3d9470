//! Typed relation operations a field can point at.
//!
//! `link`/`list` fields hold an operation object; `getBy`/`getAllBy` fields hold
//! a `RowSource` plus the column to match. Table-backed implementations live
//! here too.
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::repos::store::{DataStore, Row, match_text};
use crate::services::authz::context::AuthorizationContext;
use crate::services::resolver::error::ResolveError;

#[async_trait]
pub trait LinkOperation: Send + Sync {
    async fn link(
        &self,
        value: &Value,
        ctx: &AuthorizationContext,
        authorize: bool,
    ) -> Result<Option<Value>, ResolveError>;
}

#[async_trait]
pub trait ListOperation: Send + Sync {
    async fn list(
        &self,
        value: &Value,
        ctx: &AuthorizationContext,
        authorize: bool,
    ) -> Result<Option<Vec<Value>>, ResolveError>;
}

#[async_trait]
pub trait RowSource: Send + Sync {
    async fn find_one_by(
        &self,
        column: &str,
        value: &Value,
        ctx: &AuthorizationContext,
        authorize: bool,
    ) -> Result<Option<Value>, ResolveError>;

    async fn find_all_by(
        &self,
        column: &str,
        value: &Value,
        ctx: &AuthorizationContext,
        authorize: bool,
    ) -> Result<Vec<Value>, ResolveError>;
}

/// `owner_id` -> `ownerId`, `user-name` -> `userName`.
pub fn camelize(column: &str) -> String {
    let mut out = String::with_capacity(column.len());
    let mut upper = false;
    for c in column.chars() {
        if c == '_' || c == '-' || c == ' ' {
            upper = !out.is_empty();
            continue;
        }
        if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else if out.is_empty() {
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Rows of one table, presented with camelCase keys.
///
/// With an owner column, every row returned to an authorizing caller must
/// belong to the caller (or the caller must hold the admin role).
#[derive(Clone)]
pub struct TableSource {
    store: Arc<dyn DataStore>,
    table: String,
    owner_column: Option<String>,
}

impl TableSource {
    pub fn new(store: Arc<dyn DataStore>, table: impl Into<String>) -> Self {
        Self {
            store,
            table: table.into(),
            owner_column: None,
        }
    }

    pub fn with_owner_column(mut self, column: impl Into<String>) -> Self {
        self.owner_column = Some(column.into());
        self
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    fn check_owner(&self, row: &Row, ctx: &AuthorizationContext, authorize: bool) -> Result<(), ResolveError> {
        let Some(column) = self.owner_column.as_deref().filter(|_| authorize) else {
            return Ok(());
        };

        let owner = row.get(column).and_then(match_text).unwrap_or_default();
        ctx.assert_same_username(&owner)?;
        Ok(())
    }

    fn present(row: Row) -> Value {
        Value::Object(
            row.into_iter()
                .map(|(k, v)| (camelize(&k), v))
                .collect::<Map<String, Value>>(),
        )
    }
}

#[async_trait]
impl RowSource for TableSource {
    async fn find_one_by(
        &self,
        column: &str,
        value: &Value,
        ctx: &AuthorizationContext,
        authorize: bool,
    ) -> Result<Option<Value>, ResolveError> {
        let Some(row) = self.store.find_one_by(&self.table, column, value).await? else {
            return Ok(None);
        };

        self.check_owner(&row, ctx, authorize)?;
        Ok(Some(Self::present(row)))
    }

    async fn find_all_by(
        &self,
        column: &str,
        value: &Value,
        ctx: &AuthorizationContext,
        authorize: bool,
    ) -> Result<Vec<Value>, ResolveError> {
        let rows = self.store.find_all_by(&self.table, column, value).await?;

        for row in &rows {
            self.check_owner(row, ctx, authorize)?;
        }
        Ok(rows.into_iter().map(Self::present).collect())
    }
}

/// Single related row whose `column` equals the field value.
#[derive(Clone)]
pub struct TableLink {
    source: TableSource,
    column: String,
}

impl TableLink {
    pub fn new(source: TableSource, column: impl Into<String>) -> Self {
        Self {
            source,
            column: column.into(),
        }
    }
}

#[async_trait]
impl LinkOperation for TableLink {
    async fn link(
        &self,
        value: &Value,
        ctx: &AuthorizationContext,
        authorize: bool,
    ) -> Result<Option<Value>, ResolveError> {
        self.source.find_one_by(&self.column, value, ctx, authorize).await
    }
}

/// Every related row whose `column` equals the field value.
#[derive(Clone)]
pub struct TableList {
    source: TableSource,
    column: String,
}

impl TableList {
    pub fn new(source: TableSource, column: impl Into<String>) -> Self {
        Self {
            source,
            column: column.into(),
        }
    }
}

#[async_trait]
impl ListOperation for TableList {
    async fn list(
        &self,
        value: &Value,
        ctx: &AuthorizationContext,
        authorize: bool,
    ) -> Result<Option<Vec<Value>>, ResolveError> {
        let rows = self.source.find_all_by(&self.column, value, ctx, authorize).await?;
        Ok(Some(rows))
    }
}
