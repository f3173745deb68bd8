//! Liveness probe

use async_trait::async_trait;
use serde_json::{Value, json};
use stock_core::Result as CoreResult;
use stock_tools::Tool;

/// Always answers `{"status": "ok"}`
#[derive(Debug, Default, Clone, Copy)]
pub struct HealthCheckTool;

/// Body reported by the health probe
pub fn health_status() -> Value {
    json!({ "status": "ok" })
}

#[async_trait]
impl Tool for HealthCheckTool {
    async fn execute(&self, _params: Value) -> CoreResult<Value> {
        Ok(health_status())
    }

    fn name(&self) -> &'static str {
        "health_check"
    }

    fn description(&self) -> &'static str {
        "Check if the stock comparison server is running properly"
    }

    fn input_schema(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }
}
