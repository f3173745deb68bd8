//! Stock comparison and portfolio construction analytics
//!
//! This crate fetches historical closes from Twelve Data (through a cache),
//! aligns them into price and return panels, and derives:
//! - per-symbol metrics (latest price, cumulative return, volatility,
//!   Sharpe-like ratio, 95% historical VaR)
//! - a pairwise return correlation matrix
//! - Hierarchical Risk Parity portfolio weights
//!
//! The operations are exposed as [`stock_tools::Tool`] implementations in
//! [`tools`].

pub mod analytics;
pub mod analyzer;
pub mod api;
pub mod cache;
pub mod config;
pub mod data;
pub mod error;
pub mod tools;

pub use analyzer::{ComparisonReport, StockAnalyzer};
pub use api::TwelveDataClient;
pub use cache::{CacheStore, DiskCache, MemoryCache};
pub use config::{CacheBackend, StockConfig};
pub use data::{MarketDataFetcher, TimeSeriesSource};
pub use error::{Result, StockError};
pub use tools::register_tools;
