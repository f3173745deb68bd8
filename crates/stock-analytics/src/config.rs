//! Configuration for market data fetching and caching

use crate::error::{Result, StockError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable holding the Twelve Data API key
pub const API_KEY_ENV: &str = "TWELVE_DATA_API_KEY";

/// Where fetched payloads are cached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CacheBackend {
    /// One JSON file per entry under `cache_dir`
    #[default]
    Disk,
    /// In-process only, lost on restart
    Memory,
}

/// Configuration for stock data operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockConfig {
    /// Twelve Data API key (optional until a fetch is attempted)
    pub api_key: Option<String>,

    /// Base URL of the Twelve Data REST API
    pub base_url: String,

    /// Fixed delay before every outgoing request
    pub request_delay: Duration,

    /// Request quota per minute
    pub max_requests_per_minute: u32,

    /// Request timeout duration
    pub request_timeout: Duration,

    /// Interval used when a request does not name one
    pub default_interval: String,

    /// Number of observations used when a request does not name one
    pub default_outputsize: u32,

    /// Maximum age of cached historical series
    pub cache_ttl_historical: Duration,

    /// Maximum age of cached quotes
    pub cache_ttl_quote: Duration,

    /// Directory for the disk cache
    pub cache_dir: PathBuf,

    /// Cache implementation
    pub cache_backend: CacheBackend,
}

impl Default for StockConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.twelvedata.com".to_string(),
            request_delay: Duration::from_millis(500),
            max_requests_per_minute: 8,
            request_timeout: Duration::from_secs(15),
            default_interval: "1day".to_string(),
            default_outputsize: 30,
            cache_ttl_historical: Duration::from_secs(3600), // 1 hour
            cache_ttl_quote: Duration::from_secs(900),       // 15 minutes
            cache_dir: default_cache_dir(),
            cache_backend: CacheBackend::Disk,
        }
    }
}

/// `~/.stock_mcp_cache`, or a directory under the system temp dir when no
/// home directory is known
pub fn default_cache_dir() -> PathBuf {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map_or_else(std::env::temp_dir, PathBuf::from)
        .join(".stock_mcp_cache")
}

impl StockConfig {
    /// Create a new configuration builder
    pub fn builder() -> StockConfigBuilder {
        StockConfigBuilder::default()
    }

    /// Load the API key from environment
    pub fn with_env_api_key(mut self) -> Self {
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            self.api_key = Some(key);
        }
        self
    }

    /// The API key, or a configuration error naming the variable to set
    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key.as_deref().filter(|k| !k.is_empty()).ok_or_else(|| {
            StockError::ConfigError(format!(
                "{API_KEY_ENV} environment variable is not set. Set it in the environment."
            ))
        })
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.max_requests_per_minute == 0 {
            return Err(StockError::ConfigError(
                "max_requests_per_minute must be greater than 0".to_string(),
            ));
        }

        if self.default_outputsize == 0 {
            return Err(StockError::ConfigError(
                "default_outputsize must be greater than 0".to_string(),
            ));
        }

        if self.default_interval.trim().is_empty() {
            return Err(StockError::ConfigError(
                "default_interval must not be empty".to_string(),
            ));
        }

        url::Url::parse(&self.base_url)
            .map_err(|e| StockError::ConfigError(format!("Invalid base_url: {e}")))?;

        Ok(())
    }
}

/// Builder for StockConfig
#[derive(Debug, Default)]
pub struct StockConfigBuilder {
    api_key: Option<String>,
    base_url: Option<String>,
    request_delay: Option<Duration>,
    max_requests_per_minute: Option<u32>,
    request_timeout: Option<Duration>,
    default_interval: Option<String>,
    default_outputsize: Option<u32>,
    cache_ttl_historical: Option<Duration>,
    cache_ttl_quote: Option<Duration>,
    cache_dir: Option<PathBuf>,
    cache_backend: Option<CacheBackend>,
}

impl StockConfigBuilder {
    /// Set the API key
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Load the API key from environment
    pub fn with_env_api_key(mut self) -> Self {
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            self.api_key = Some(key);
        }
        self
    }

    /// Set the API base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the fixed delay before each request
    pub fn request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = Some(delay);
        self
    }

    /// Set the per-minute request quota
    pub fn max_requests_per_minute(mut self, quota: u32) -> Self {
        self.max_requests_per_minute = Some(quota);
        self
    }

    /// Set request timeout
    pub fn request_timeout(mut self, duration: Duration) -> Self {
        self.request_timeout = Some(duration);
        self
    }

    /// Set the default interval
    pub fn default_interval(mut self, interval: impl Into<String>) -> Self {
        self.default_interval = Some(interval.into());
        self
    }

    /// Set the default output size
    pub fn default_outputsize(mut self, outputsize: u32) -> Self {
        self.default_outputsize = Some(outputsize);
        self
    }

    /// Set cache TTL for historical series
    pub fn cache_ttl_historical(mut self, duration: Duration) -> Self {
        self.cache_ttl_historical = Some(duration);
        self
    }

    /// Set cache TTL for quotes
    pub fn cache_ttl_quote(mut self, duration: Duration) -> Self {
        self.cache_ttl_quote = Some(duration);
        self
    }

    /// Set the disk cache directory
    pub fn cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(dir.into());
        self
    }

    /// Set the cache backend
    pub fn cache_backend(mut self, backend: CacheBackend) -> Self {
        self.cache_backend = Some(backend);
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<StockConfig> {
        let defaults = StockConfig::default();

        let config = StockConfig {
            api_key: self.api_key,
            base_url: self.base_url.unwrap_or(defaults.base_url),
            request_delay: self.request_delay.unwrap_or(defaults.request_delay),
            max_requests_per_minute: self
                .max_requests_per_minute
                .unwrap_or(defaults.max_requests_per_minute),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            default_interval: self.default_interval.unwrap_or(defaults.default_interval),
            default_outputsize: self.default_outputsize.unwrap_or(defaults.default_outputsize),
            cache_ttl_historical: self
                .cache_ttl_historical
                .unwrap_or(defaults.cache_ttl_historical),
            cache_ttl_quote: self.cache_ttl_quote.unwrap_or(defaults.cache_ttl_quote),
            cache_dir: self.cache_dir.unwrap_or(defaults.cache_dir),
            cache_backend: self.cache_backend.unwrap_or(defaults.cache_backend),
        };

        config.validate()?;
        Ok(config)
    }
}
