//! Record creation.
//!
//! Copies submitted form fields into a new row in the destination table's
//! header-column order. No validation beyond the header row: unknown form
//! fields are ignored and missing ones become empty cells. Headers that
//! carry `date` or `updated` (case-insensitive) are stamped with the current
//! local time instead of form input.

use std::collections::HashMap;

use chrono::Local;
use tracing::debug;

use crate::error::StoreResult;
use crate::store::TableStore;

/// Format used for stamped timestamp columns.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Build the row for `headers` from submitted form fields.
pub fn build_row(
    headers: &[String],
    form: &HashMap<String, String>,
    timestamp: &str,
) -> Vec<String> {
    headers
        .iter()
        .map(|header| {
            let lower = header.to_lowercase();
            if lower.contains("date") || lower.contains("updated") {
                timestamp.to_string()
            } else {
                form.get(header).cloned().unwrap_or_default()
            }
        })
        .collect()
}

/// Append one form submission to `table` and return the written row.
pub async fn append_record(
    store: &dyn TableStore,
    table: &str,
    form: &HashMap<String, String>,
) -> StoreResult<Vec<String>> {
    let headers = store.read_table(table).await?.headers;
    let timestamp = Local::now().format(TIMESTAMP_FORMAT).to_string();
    let row = build_row(&headers, form, &timestamp);

    debug!(table, columns = row.len(), "appending record");
    store.append_row(table, row.clone()).await?;
    Ok(row)
}
