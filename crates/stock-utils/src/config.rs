//! Server identity configuration

use serde::{Deserialize, Serialize};

/// Identity reported to clients during initialization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server name
    pub server_name: String,
    /// Server version
    pub server_version: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_name: "stock-comparison".to_string(),
            server_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_identity() {
        let config = Config::default();
        assert_eq!(config.server_name, "stock-comparison");
        assert!(!config.server_version.is_empty());
    }

    #[test]
    fn test_serialization_round_trip_shape() {
        let json = serde_json::to_value(Config::default()).unwrap();
        assert_eq!(json["server_name"], "stock-comparison");
    }
}
