//! Error types for the tickbar system.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the tickbar system.
#[derive(Error, Debug)]
pub enum Error {
    /// A required column is missing or has the wrong type.
    #[error("Schema error: {0}")]
    Schema(String),

    /// Configuration error (bar size, duration grammar, unknown option).
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data error (rows that cannot be sampled and cannot be skipped).
    #[error("Data error: {0}")]
    Data(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a schema error.
    pub fn schema(msg: impl Into<String>) -> Self {
        Error::Schema(msg.into())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Create a data error.
    pub fn data(msg: impl Into<String>) -> Self {
        Error::Data(msg.into())
    }

    /// Create the error for a missing column.
    pub fn missing_column(role: &str, name: &str) -> Self {
        Error::Schema(format!("{role} column '{name}' not found"))
    }
}
