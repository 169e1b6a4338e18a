//! Table store abstraction.
//!
//! Row storage is an external system of record reached by table name.
//! Adapters return every row of a table in sheet order and can append one
//! new row; no schema is enforced beyond the header row. Concurrent reads
//! may observe different snapshots, and no atomicity holds across reads of
//! different tables.

use std::fmt;

use async_trait::async_trait;

use crate::error::StoreResult;

pub mod memory;
pub mod sheets;

pub use memory::MemoryStore;
pub use sheets::SheetsStore;

/// A table snapshot: header row plus data rows, in sheet order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Create a table from a header row and data rows.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Project the data rows onto the header row.
    ///
    /// Rows shorter than the header list are padded with empty strings;
    /// cells beyond the last header are dropped.
    pub fn records(&self) -> Vec<Record> {
        self.rows
            .iter()
            .map(|row| {
                let fields = self
                    .headers
                    .iter()
                    .enumerate()
                    .map(|(i, header)| {
                        let value = row.get(i).cloned().unwrap_or_default();
                        (header.clone(), value)
                    })
                    .collect();
                Record::new(fields)
            })
            .collect()
    }
}

/// One row keyed by header, field order preserved.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Record {
    fields: Vec<(String, String)>,
}

impl Record {
    /// Create a record from ordered field/value pairs.
    pub fn new(fields: Vec<(String, String)>) -> Self {
        Self { fields }
    }

    /// Look up a field value; the first matching field wins.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value.as_str())
    }

    /// Ordered field/value pairs.
    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }
}

impl fmt::Display for Record {
    /// Direct textual rendering of the field/value pairs, in field order.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (field, value)) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}={}", field, value)?;
        }
        Ok(())
    }
}

/// External tabular data store, reached by table name.
#[async_trait]
pub trait TableStore: Send + Sync {
    /// Read an entire table: header row plus all data rows, in sheet order.
    async fn read_table(&self, name: &str) -> StoreResult<Table>;

    /// Append one row. Values must be in the destination table's
    /// header-column order.
    async fn append_row(&self, name: &str, values: Vec<String>) -> StoreResult<()>;
}
