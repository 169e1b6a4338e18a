//! Runtime configuration for the external collaborators.
//!
//! Both engines receive their collaborators as injected arguments; these
//! structs only carry the knobs the concrete adapters need. Defaults read
//! from the environment so a deployment configures itself through env vars
//! alone.

/// Model provider configuration.
#[derive(Debug, Clone)]
pub struct AiConfig {
    /// API key for the provider.
    pub api_key: String,

    /// Model name to use.
    pub model: String,

    /// Maximum tokens in the response.
    pub max_tokens: Option<u32>,

    /// Temperature for response generation (0.0 - 1.0).
    pub temperature: Option<f32>,

    /// Request timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: std::env::var("OPENAI_API_KEY").unwrap_or_default(),
            model: "gpt-4o-mini".to_string(),
            max_tokens: Some(1024),
            temperature: Some(0.2),
            timeout_seconds: 30,
        }
    }
}

impl AiConfig {
    /// Create a new model provider configuration.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            ..Self::default()
        }
    }

    /// Set maximum response tokens.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set generation temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = timeout_seconds;
        self
    }
}

/// Google Sheets table store configuration.
#[derive(Debug, Clone)]
pub struct SheetsConfig {
    /// API key for the Sheets API.
    pub api_key: String,

    /// Spreadsheet holding all risk tables as worksheets.
    pub spreadsheet_id: String,

    /// Request timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            api_key: std::env::var("SHEETS_API_KEY").unwrap_or_default(),
            spreadsheet_id: std::env::var("SHEETS_SPREADSHEET_ID").unwrap_or_default(),
            timeout_seconds: 30,
        }
    }
}

impl SheetsConfig {
    /// Create a new Sheets store configuration.
    pub fn new(api_key: impl Into<String>, spreadsheet_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            spreadsheet_id: spreadsheet_id.into(),
            timeout_seconds: 30,
        }
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = timeout_seconds;
        self
    }
}

/// Grounded query service configuration.
#[derive(Debug, Clone)]
pub struct QueryConfig {
    /// Maximum number of risk records serialized into one model request.
    /// Records past the limit are dropped from the context.
    pub max_context_records: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            max_context_records: 1000,
        }
    }
}

impl QueryConfig {
    /// Set the context record limit.
    pub fn with_max_context_records(mut self, max_context_records: usize) -> Self {
        self.max_context_records = max_context_records;
        self
    }
}
