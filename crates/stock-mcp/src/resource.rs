//! Readable resources exposed by the server

use async_trait::async_trait;
use serde_json::json;

use crate::Result;
use crate::protocol::ResourceDefinition;

/// A resource clients can list and read
#[async_trait]
pub trait Resource: Send + Sync {
    /// Resource URI (e.g. `stock://health`)
    fn uri(&self) -> &str;

    fn name(&self) -> &str;

    fn description(&self) -> Option<&str> {
        None
    }

    fn mime_type(&self) -> Option<&str> {
        None
    }

    /// Current text content
    async fn read(&self) -> Result<String>;

    /// Listing entry for resources/list
    fn definition(&self) -> ResourceDefinition {
        ResourceDefinition {
            uri: self.uri().to_string(),
            name: self.name().to_string(),
            description: self.description().map(str::to_string),
            mime_type: self.mime_type().map(str::to_string),
        }
    }
}

/// `stock://health`: reports `{"status": "ok"}`
#[derive(Debug, Default, Clone, Copy)]
pub struct HealthResource;

#[async_trait]
impl Resource for HealthResource {
    fn uri(&self) -> &'static str {
        "stock://health"
    }

    fn name(&self) -> &'static str {
        "Server Health"
    }

    fn description(&self) -> Option<&str> {
        Some("Check server health status")
    }

    fn mime_type(&self) -> Option<&str> {
        Some("application/json")
    }

    async fn read(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&json!({ "status": "ok" }))?)
    }
}
