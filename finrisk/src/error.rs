//! Error taxonomy for the lending-risk core.
//!
//! Two failure families exist: table store failures are hard failures that
//! propagate to the caller of the triggering request, while model provider
//! failures are absorbed at the query-service boundary and rendered as a
//! user-visible answer string. Bad data (unmatched keys, malformed numeric
//! fields) is not an error at all and never appears here.

use thiserror::Error;

/// Errors raised by table store adapters.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("table '{0}' not found")]
    TableNotFound(String),

    #[error("table store request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("table store API error: HTTP {status}: {message}")]
    Api { status: u16, message: String },

    #[error("malformed table store response: {0}")]
    MalformedResponse(String),

    #[error("store configuration error: {0}")]
    Configuration(String),
}

/// Errors raised by model provider clients.
#[derive(Error, Debug)]
pub enum AiError {
    #[error("authentication error: missing or invalid API key")]
    AuthenticationError,

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: HTTP {status}: {message}")]
    Api { status: u16, message: String },

    #[error("invalid response format: {0}")]
    InvalidResponse(String),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Result type for model provider operations.
pub type AiResult<T> = Result<T, AiError>;
