//! API clients for market data providers

pub mod twelve_data;

pub use twelve_data::{TwelveDataClient, check_api_error};
