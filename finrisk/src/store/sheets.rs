//! Google Sheets table store adapter.
//!
//! Each dashboard table is a worksheet of one spreadsheet, reached through
//! the Sheets v4 values API. Reads fetch the full value range of the
//! worksheet; appends submit one row with USER_ENTERED input.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use super::{Table, TableStore};
use crate::config::SheetsConfig;
use crate::error::{StoreError, StoreResult};

/// Sheets API client.
#[derive(Debug, Clone)]
pub struct SheetsStore {
    config: SheetsConfig,
    client: Client,
    base_url: String,
}

/// Value range returned by `values.get`.
#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

/// Request body for `values.append`.
#[derive(Debug, Serialize)]
struct AppendRequest {
    values: Vec<Vec<String>>,
}

impl SheetsStore {
    /// Create a new Sheets store client.
    pub fn new(config: SheetsConfig) -> StoreResult<Self> {
        if config.api_key.is_empty() {
            return Err(StoreError::Configuration(
                "missing Sheets API key".to_string(),
            ));
        }
        if config.spreadsheet_id.is_empty() {
            return Err(StoreError::Configuration(
                "missing spreadsheet id".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(StoreError::Http)?;

        let base_url = "https://sheets.googleapis.com/v4/spreadsheets".to_string();

        Ok(Self {
            config,
            client,
            base_url,
        })
    }

    /// Split a raw value range into a header row and data rows.
    fn table_from_values(mut values: Vec<Vec<String>>) -> Table {
        if values.is_empty() {
            return Table::default();
        }
        let headers = values.remove(0);
        Table::new(headers, values)
    }
}

#[async_trait]
impl TableStore for SheetsStore {
    async fn read_table(&self, name: &str) -> StoreResult<Table> {
        let url = format!(
            "{}/{}/values/{}?key={}",
            self.base_url, self.config.spreadsheet_id, name, self.config.api_key
        );

        debug!("reading table '{}' from sheets", name);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status == reqwest::StatusCode::BAD_REQUEST || status == reqwest::StatusCode::NOT_FOUND {
            return Err(StoreError::TableNotFound(name.to_string()));
        }
        if !status.is_success() {
            error!("Sheets API error: {} - {}", status, body);
            return Err(StoreError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let range: ValueRange = serde_json::from_str(&body)
            .map_err(|e| StoreError::MalformedResponse(e.to_string()))?;

        Ok(Self::table_from_values(range.values))
    }

    async fn append_row(&self, name: &str, values: Vec<String>) -> StoreResult<()> {
        let url = format!(
            "{}/{}/values/{}:append?valueInputOption=USER_ENTERED&key={}",
            self.base_url, self.config.spreadsheet_id, name, self.config.api_key
        );

        debug!("appending {} values to table '{}'", values.len(), name);

        let request_body = AppendRequest {
            values: vec![values],
        };

        let response = self.client.post(&url).json(&request_body).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::BAD_REQUEST || status == reqwest::StatusCode::NOT_FOUND {
            return Err(StoreError::TableNotFound(name.to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Sheets API error: {} - {}", status, body);
            return Err(StoreError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_config() -> SheetsConfig {
        SheetsConfig::new("test-key", "test-spreadsheet")
    }

    #[test]
    fn test_sheets_store_creation() {
        let store = SheetsStore::new(create_test_config());
        assert!(store.is_ok());
    }

    #[test]
    fn test_sheets_store_missing_key() {
        let mut config = create_test_config();
        config.api_key = "".to_string();
        let store = SheetsStore::new(config);
        assert!(matches!(store.err(), Some(StoreError::Configuration(_))));
    }

    #[test]
    fn test_sheets_store_missing_spreadsheet() {
        let mut config = create_test_config();
        config.spreadsheet_id = "".to_string();
        let store = SheetsStore::new(config);
        assert!(matches!(store.err(), Some(StoreError::Configuration(_))));
    }

    #[test]
    fn test_table_from_values() {
        let values = vec![
            vec!["loan_id".to_string(), "borrower_id".to_string()],
            vec!["L-1".to_string(), "B-1".to_string()],
        ];
        let table = SheetsStore::table_from_values(values);
        assert_eq!(table.headers, vec!["loan_id", "borrower_id"]);
        assert_eq!(table.rows.len(), 1);
    }

    #[test]
    fn test_table_from_empty_values() {
        let table = SheetsStore::table_from_values(vec![]);
        assert!(table.headers.is_empty());
        assert!(table.rows.is_empty());
    }

    #[test]
    fn test_value_range_parsing() {
        let json = r#"{
            "range": "loans!A1:B3",
            "majorDimension": "ROWS",
            "values": [["loan_id", "borrower_id"], ["L-1", "B-1"], ["L-2", "B-2"]]
        }"#;
        let range: ValueRange = serde_json::from_str(json).unwrap();
        assert_eq!(range.values.len(), 3);

        let empty: ValueRange = serde_json::from_str(r#"{"range": "loans!A1"}"#).unwrap();
        assert!(empty.values.is_empty());
    }
}
