//! Error types for stock analytics operations

use thiserror::Error;

/// Stock analytics specific errors
#[derive(Debug, Error)]
pub enum StockError {
    /// The data source answered with an error body
    #[error("API error: {0}")]
    ApiError(String),

    /// Fetching one symbol failed; aborts the whole request
    #[error("Error fetching {symbol}: {payload}")]
    FetchFailed {
        symbol: String,
        payload: String,
    },

    /// The HRP optimizer could not produce weights
    #[error("Allocation failed: {0}")]
    AllocationFailed(String),

    /// Network or HTTP error
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Filesystem error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Cache error
    #[error("Cache error: {0}")]
    CacheError(String),
}

/// Result type alias for stock operations
pub type Result<T> = std::result::Result<T, StockError>;

/// Convert StockError to stock_core::Error
impl From<StockError> for stock_core::Error {
    fn from(err: StockError) -> Self {
        stock_core::Error::ProcessingFailed(err.to_string())
    }
}
