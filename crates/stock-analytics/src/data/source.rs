//! Data source abstraction

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cache::historical_key;
use crate::error::Result;

/// Parameters of one historical series request, defaults already resolved
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeriesRequest {
    /// Upper-cased ticker symbol
    pub symbol: String,
    /// Sampling interval token, e.g. `1day` or `1h`
    pub interval: String,
    /// Number of observations requested
    pub outputsize: u32,
}

impl SeriesRequest {
    /// Create a request; the symbol is upper-cased
    pub fn new(symbol: &str, interval: impl Into<String>, outputsize: u32) -> Self {
        Self {
            symbol: symbol.trim().to_uppercase(),
            interval: interval.into(),
            outputsize,
        }
    }

    /// Cache key for this request
    pub fn cache_key(&self) -> String {
        historical_key(&self.symbol, &self.interval, self.outputsize)
    }
}

/// A provider of raw market data payloads
///
/// Implementations return the provider's JSON body. Transport failures and
/// rejected requests are errors; validation into a series happens later.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TimeSeriesSource: Send + Sync {
    /// Fetch the historical series payload for a request
    async fn time_series(&self, request: &SeriesRequest) -> Result<Value>;

    /// Fetch the latest quote payload for a symbol
    async fn quote(&self, symbol: &str) -> Result<Value>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_normalizes_symbol() {
        let req = SeriesRequest::new(" aapl ", "1day", 30);
        assert_eq!(req.symbol, "AAPL");
        assert_eq!(req.cache_key(), "historical:AAPL:1day:30");
    }
}
