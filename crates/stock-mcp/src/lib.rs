//! Model Context Protocol (MCP) server for the stock comparison tools
//!
//! This crate exposes a [`stock_tools::ToolRegistry`] to MCP clients:
//! - JSON-RPC 2.0 messages, one per line, over stdio
//! - `initialize`, `ping`, `tools/list`, `tools/call`
//! - `resources/list` and `resources/read` (the `stock://health` resource)
//!
//! # Example
//!
//! ```no_run
//! use stock_mcp::McpServer;
//! use stock_tools::ToolRegistry;
//! use stock_utils::Config;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = Arc::new(ToolRegistry::new());
//! let server = McpServer::new(&Config::default(), registry);
//! server.serve_stdio().await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod protocol;
pub mod resource;
pub mod server;

pub use error::McpError;
pub use protocol::PROTOCOL_VERSION;
pub use resource::{HealthResource, Resource};
pub use server::McpServer;

/// Result type for MCP operations
pub type Result<T> = std::result::Result<T, McpError>;
