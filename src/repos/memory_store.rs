//! In-memory DataStore used for development and tests.
//!
//! Counts every call so callers can assert on store traffic.
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use serde_json::Value;

use crate::repos::error::RepoResult;
use crate::repos::store::{DataStore, Row, match_text};

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<String, Vec<Row>>>,
    selects: AtomicUsize,
    inserts: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(self, table: &str, rows: impl IntoIterator<Item = Row>) -> Self {
        for row in rows {
            self.seed(table, row);
        }
        self
    }

    /// Add a row without counting it as an insert.
    pub fn seed(&self, table: &str, row: Row) {
        self.tables
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(table.to_string())
            .or_default()
            .push(row);
    }

    pub fn rows(&self, table: &str) -> Vec<Row> {
        self.tables
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    pub fn select_count(&self) -> usize {
        self.selects.load(Ordering::SeqCst)
    }

    pub fn insert_count(&self) -> usize {
        self.inserts.load(Ordering::SeqCst)
    }

    pub fn call_count(&self) -> usize {
        self.select_count() + self.insert_count()
    }

    fn matching(&self, table: &str, column: &str, value: &Value) -> Vec<Row> {
        self.selects.fetch_add(1, Ordering::SeqCst);

        let Some(wanted) = match_text(value) else {
            return Vec::new();
        };

        self.tables
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| row.get(column).and_then(match_text).as_deref() == Some(wanted.as_str()))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[async_trait]
impl DataStore for MemoryStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn find_one_by(
        &self,
        table: &str,
        column: &str,
        value: &Value,
    ) -> RepoResult<Option<Row>> {
        Ok(self.matching(table, column, value).into_iter().next())
    }

    async fn find_all_by(&self, table: &str, column: &str, value: &Value) -> RepoResult<Vec<Row>> {
        Ok(self.matching(table, column, value))
    }

    async fn insert(&self, table: &str, values: Row) -> RepoResult<u64> {
        self.inserts.fetch_add(1, Ordering::SeqCst);
        self.tables
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(table.to_string())
            .or_default()
            .push(values);
        Ok(1)
    }
}
