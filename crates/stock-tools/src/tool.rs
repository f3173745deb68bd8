//! Tool trait definition

use async_trait::async_trait;
use serde_json::Value;
use stock_core::Result;

/// Trait for tools exposed through the tool-call interface
///
/// Each tool provides a name, a description, and a JSON schema for its input.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Execute the tool with given parameters
    ///
    /// # Arguments
    ///
    /// * `params` - Tool input as JSON value (should match input_schema)
    ///
    /// # Returns
    ///
    /// Tool output as JSON value
    async fn execute(&self, params: Value) -> Result<Value>;

    /// Get the tool's name
    ///
    /// Must be unique within a ToolRegistry
    fn name(&self) -> &str;

    /// Get the tool's description
    fn description(&self) -> &str;

    /// Get the tool's input schema (JSON Schema format)
    ///
    /// # Example
    ///
    /// ```
    /// use serde_json::json;
    ///
    /// let schema = json!({
    ///     "type": "object",
    ///     "properties": {
    ///         "symbols": {
    ///             "type": "array",
    ///             "items": { "type": "string" }
    ///         }
    ///     },
    ///     "required": ["symbols"]
    /// });
    /// ```
    fn input_schema(&self) -> Value;
}
