//! Tool management and execution framework
//!
//! This crate provides the `Tool` trait implemented by every callable
//! analytics operation and the registry the transport dispatches through.

pub mod registry;
pub mod tool;

pub use registry::ToolRegistry;
pub use tool::Tool;
