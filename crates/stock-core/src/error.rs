//! Error types for stock-core

use thiserror::Error;

/// Result type alias for stock-core
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for tool execution
#[derive(Error, Debug)]
pub enum Error {
    /// Generic error message
    #[error("{0}")]
    Generic(String),

    /// Tool parameters could not be decoded
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    /// Tool processing failed
    #[error("Tool processing failed: {0}")]
    ProcessingFailed(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::InvalidParameters(err.to_string())
    }
}
