/*
 * Responsibility
 * - PostgreSQL implementation of the DataStore capability (SQLx)
 * - Table/column names come from configuration and are always quoted
 * - Rows are returned as json objects (to_jsonb) so any table fits the same shape
 */
use async_trait::async_trait;
use serde_json::Value;
use sqlx::{PgPool, types::Json};

use crate::repos::error::{RepoError, RepoResult};
use crate::repos::store::{DataStore, Row, into_row, match_text};

#[derive(Clone, Debug)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> RepoResult<Self> {
        let pool = PgPool::connect(database_url).await?;
        Ok(Self::new(pool))
    }
}

/// Quote a (possibly schema-qualified) identifier: `public.user_data` -> `"public"."user_data"`.
pub fn quote_ident(name: &str) -> RepoResult<String> {
    if name.is_empty() || name.contains('\0') {
        return Err(RepoError::InvalidIdentifier(name.to_string()));
    }

    let mut quoted = Vec::new();
    for part in name.split('.') {
        if part.is_empty() {
            return Err(RepoError::InvalidIdentifier(name.to_string()));
        }
        quoted.push(format!("\"{}\"", part.replace('"', "\"\"")));
    }

    Ok(quoted.join("."))
}

#[async_trait]
impl DataStore for PgStore {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    async fn find_one_by(
        &self,
        table: &str,
        column: &str,
        value: &Value,
    ) -> RepoResult<Option<Row>> {
        // Compare on the text form so any scalar source value can match any column type.
        let sql = format!(
            r#"
            SELECT to_jsonb(t)
            FROM {table} AS t
            WHERE t.{column}::text = $1
            LIMIT 1
            "#,
            table = quote_ident(table)?,
            column = quote_ident(column)?,
        );

        let row = sqlx::query_scalar::<_, Json<Value>>(&sql)
            .bind(match_text(value))
            .fetch_optional(&self.pool)
            .await?;

        row.map(|Json(v)| into_row(v)).transpose()
    }

    async fn find_all_by(&self, table: &str, column: &str, value: &Value) -> RepoResult<Vec<Row>> {
        let sql = format!(
            r#"
            SELECT to_jsonb(t)
            FROM {table} AS t
            WHERE t.{column}::text = $1
            "#,
            table = quote_ident(table)?,
            column = quote_ident(column)?,
        );

        let rows = sqlx::query_scalar::<_, Json<Value>>(&sql)
            .bind(match_text(value))
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(|Json(v)| into_row(v)).collect()
    }

    async fn insert(&self, table: &str, values: Row) -> RepoResult<u64> {
        let table = quote_ident(table)?;

        if values.is_empty() {
            let sql = format!("INSERT INTO {table} DEFAULT VALUES");
            let res = sqlx::query(&sql).execute(&self.pool).await?;
            return Ok(res.rows_affected());
        }

        let columns = values
            .keys()
            .map(|c| quote_ident(c))
            .collect::<RepoResult<Vec<_>>>()?
            .join(", ");

        // jsonb_populate_record keeps each value typed as its target column.
        let sql = format!(
            r#"
            INSERT INTO {table} ({columns})
            SELECT {columns}
            FROM jsonb_populate_record(NULL::{table}, $1)
            "#
        );

        let res = sqlx::query(&sql)
            .bind(Json(Value::Object(values)))
            .execute(&self.pool)
            .await?;

        Ok(res.rows_affected())
    }
}
