//! Cached market data fetching

use serde_json::Value;
use std::sync::Arc;

use crate::analytics::PriceSeries;
use crate::cache::{CacheStore, quote_key};
use crate::config::StockConfig;
use crate::data::payload::FetchResult;
use crate::data::source::{SeriesRequest, TimeSeriesSource};
use crate::error::{Result, StockError};

/// Combines a data source with a payload cache
///
/// The cache is transparent: a hit returns exactly the payload a miss would
/// have fetched and stored.
#[derive(Clone)]
pub struct MarketDataFetcher {
    source: Arc<dyn TimeSeriesSource>,
    cache: Arc<dyn CacheStore>,
    config: Arc<StockConfig>,
}

impl MarketDataFetcher {
    /// Create a new fetcher
    pub fn new(
        source: Arc<dyn TimeSeriesSource>,
        cache: Arc<dyn CacheStore>,
        config: Arc<StockConfig>,
    ) -> Self {
        Self {
            source,
            cache,
            config,
        }
    }

    /// The configuration this fetcher was built with
    pub fn config(&self) -> &StockConfig {
        &self.config
    }

    /// Resolve a request, filling in the configured defaults
    ///
    /// An empty interval or a zero output size counts as not given.
    pub fn request(
        &self,
        symbol: &str,
        interval: Option<&str>,
        outputsize: Option<u32>,
    ) -> SeriesRequest {
        let interval = interval
            .filter(|i| !i.is_empty())
            .unwrap_or(self.config.default_interval.as_str());
        let outputsize = outputsize
            .filter(|n| *n > 0)
            .unwrap_or(self.config.default_outputsize);
        SeriesRequest::new(symbol, interval, outputsize)
    }

    /// Historical series payload, from cache when fresh enough
    pub async fn historical(&self, request: &SeriesRequest) -> Result<Value> {
        let key = request.cache_key();
        if let Some(value) = self
            .cache
            .load(&key, Some(self.config.cache_ttl_historical))
            .await
        {
            tracing::debug!("Cache hit for key: {}", key);
            return Ok(value);
        }

        tracing::debug!("Cache miss for key: {}", key);
        let value = self.source.time_series(request).await?;
        self.store(&key, &value).await;
        Ok(value)
    }

    /// Latest quote payload, from cache when fresh enough
    pub async fn quote(&self, symbol: &str) -> Result<Value> {
        let symbol = symbol.trim().to_uppercase();
        let key = quote_key(&symbol);
        if let Some(value) = self.cache.load(&key, Some(self.config.cache_ttl_quote)).await {
            tracing::debug!("Cache hit for key: {}", key);
            return Ok(value);
        }

        tracing::debug!("Cache miss for key: {}", key);
        let value = self.source.quote(&symbol).await?;
        self.store(&key, &value).await;
        Ok(value)
    }

    /// Fetch and normalize one symbol's price series
    ///
    /// Both a failing source and an error payload become
    /// [`StockError::FetchFailed`] naming the symbol.
    pub async fn fetch_series(&self, request: &SeriesRequest) -> Result<PriceSeries> {
        tracing::debug!(
            "Fetching {} (interval={}, outputsize={})",
            request.symbol,
            request.interval,
            request.outputsize
        );

        let payload = self
            .historical(request)
            .await
            .map_err(|e| StockError::FetchFailed {
                symbol: request.symbol.clone(),
                payload: e.to_string(),
            })?;

        match FetchResult::from_payload(&payload) {
            FetchResult::Series(raw) => {
                Ok(PriceSeries::normalize(raw).with_name(request.symbol.clone()))
            },
            FetchResult::Error(message) => Err(StockError::FetchFailed {
                symbol: request.symbol.clone(),
                payload: message,
            }),
        }
    }

    /// Remove every cached payload
    pub async fn clear_cache(&self) -> Result<()> {
        self.cache.clear().await
    }

    async fn store(&self, key: &str, value: &Value) {
        // A cache write failure must not fail the request.
        if let Err(e) = self.cache.save(key, value.clone()).await {
            tracing::warn!("Failed to cache {}: {}", key, e);
        }
    }
}
