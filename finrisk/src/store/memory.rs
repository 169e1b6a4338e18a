//! In-memory table store.
//!
//! Backs tests and local runs where no spreadsheet is reachable. Tables are
//! held behind an async lock so appends from concurrent requests serialize.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{Table, TableStore};
use crate::error::{StoreError, StoreResult};

/// Table store backed by process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<String, Table>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a table, builder-style.
    pub fn with_table(
        mut self,
        name: impl Into<String>,
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
    ) -> Self {
        self.tables
            .get_mut()
            .insert(name.into(), Table::new(headers, rows));
        self
    }
}

#[async_trait]
impl TableStore for MemoryStore {
    async fn read_table(&self, name: &str) -> StoreResult<Table> {
        let tables = self.tables.read().await;
        tables
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::TableNotFound(name.to_string()))
    }

    async fn append_row(&self, name: &str, values: Vec<String>) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        let table = tables
            .get_mut(name)
            .ok_or_else(|| StoreError::TableNotFound(name.to_string()))?;
        table.rows.push(values);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[tokio::test]
    async fn test_read_and_append() {
        let store = MemoryStore::new().with_table(
            "loans",
            strings(&["loan_id", "borrower_id"]),
            vec![strings(&["L-1", "B-1"])],
        );

        let table = store.read_table("loans").await.unwrap();
        assert_eq!(table.rows.len(), 1);

        store
            .append_row("loans", strings(&["L-2", "B-2"]))
            .await
            .unwrap();
        let table = store.read_table("loans").await.unwrap();
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1], strings(&["L-2", "B-2"]));
    }

    #[tokio::test]
    async fn test_unknown_table() {
        let store = MemoryStore::new();
        let err = store.read_table("payroll").await.unwrap_err();
        assert!(matches!(err, StoreError::TableNotFound(name) if name == "payroll"));

        let err = store.append_row("payroll", vec![]).await.unwrap_err();
        assert!(matches!(err, StoreError::TableNotFound(_)));
    }
}
