//! Core types for the stock comparison server
//!
//! This crate defines the error type that crosses crate boundaries: tools
//! report failures through it and the transport renders it for callers.

pub mod error;

pub use error::{Error, Result};
