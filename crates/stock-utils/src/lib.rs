//! Shared utilities for the stock comparison server
//!
//! This crate provides logging setup and the server identity used during the
//! protocol handshake.

pub mod config;
pub mod logging;

pub use config::Config;
pub use logging::{init_tracing, init_tracing_with_level};
