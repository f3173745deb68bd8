//! Error types for MCP operations

use thiserror::Error;

use crate::protocol::error_codes;

/// Errors that can occur while serving MCP requests
#[derive(Error, Debug)]
pub enum McpError {
    /// The incoming line is not valid JSON
    #[error("Parse error: {0}")]
    ParseError(String),

    /// The message is JSON but not a JSON-RPC request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// No handler for the method
    #[error("Method not found: {0}")]
    MethodNotFound(String),

    /// Request parameters are missing or malformed
    #[error("Invalid params: {0}")]
    InvalidParams(String),

    /// Resource not found
    #[error("Unknown resource: {0}")]
    ResourceNotFound(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl McpError {
    /// JSON-RPC error code reported for this error
    pub fn code(&self) -> i64 {
        match self {
            McpError::ParseError(_) => error_codes::PARSE_ERROR,
            McpError::InvalidRequest(_) => error_codes::INVALID_REQUEST,
            McpError::MethodNotFound(_) => error_codes::METHOD_NOT_FOUND,
            McpError::InvalidParams(_) => error_codes::INVALID_PARAMS,
            McpError::ResourceNotFound(_) => error_codes::RESOURCE_NOT_FOUND,
            McpError::InternalError(_) | McpError::JsonError(_) | McpError::IoError(_) => {
                error_codes::INTERNAL_ERROR
            },
        }
    }
}

/// Convert McpError to stock_core::Error
impl From<McpError> for stock_core::Error {
    fn from(err: McpError) -> Self {
        stock_core::Error::ProcessingFailed(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(McpError::ParseError("x".into()).code(), -32700);
        assert_eq!(McpError::MethodNotFound("x".into()).code(), -32601);
        assert_eq!(McpError::InvalidParams("x".into()).code(), -32602);
        assert_eq!(McpError::InternalError("x".into()).code(), -32603);
    }

    #[test]
    fn test_resource_not_found_message() {
        let err = McpError::ResourceNotFound("stock://nope".to_string());
        assert_eq!(err.to_string(), "Unknown resource: stock://nope");
    }
}
