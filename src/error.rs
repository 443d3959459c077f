use thiserror::Error;

/// Main error type for Schemalign
#[derive(Error, Debug)]
pub enum SchemalignError {
    /// File system I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network-level failure talking to the chat API (connect, timeout, body read)
    #[error("Network error: {0}")]
    Network(String),

    /// Chat API answered 429
    #[error("Rate limited by chat API: {0}")]
    RateLimited(String),

    /// Chat API answered with any other non-success status
    #[error("Chat API error {status}: {body}")]
    Api { status: u16, body: String },

    /// Model output that could not be interpreted
    #[error("Parse error: {0}")]
    Parse(String),
}

impl SchemalignError {
    /// Rate limits, server errors and network failures may succeed on a later attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            SchemalignError::RateLimited(_) | SchemalignError::Network(_) => true,
            SchemalignError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Convenient Result type using SchemalignError
pub type Result<T> = std::result::Result<T, SchemalignError>;
