//! Twelve Data API client

use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::Client;
use serde_json::Value;
use std::num::NonZeroU32;
use std::sync::Arc;
use url::Url;

use crate::config::StockConfig;
use crate::data::source::{SeriesRequest, TimeSeriesSource};
use crate::error::{Result, StockError};

type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// Twelve Data REST client
///
/// Every call waits the configured request delay and then for a slot in the
/// per-minute quota before going out.
#[derive(Debug, Clone)]
pub struct TwelveDataClient {
    client: Client,
    config: Arc<StockConfig>,
    rate_limiter: SharedRateLimiter,
}

impl TwelveDataClient {
    /// Create a client from configuration
    ///
    /// The API key is not checked here; a missing key fails the first call.
    pub fn new(config: Arc<StockConfig>) -> Result<Self> {
        let client = Client::builder().timeout(config.request_timeout).build()?;

        let quota = Quota::per_minute(
            NonZeroU32::new(config.max_requests_per_minute).unwrap_or(NonZeroU32::MIN),
        );
        let rate_limiter = Arc::new(RateLimiter::direct(quota));

        Ok(Self {
            client,
            config,
            rate_limiter,
        })
    }

    /// Full URL for an API path
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        let raw = format!("{}/{}", self.config.base_url.trim_end_matches('/'), path);
        Url::parse(&raw).map_err(|e| StockError::ConfigError(format!("Invalid URL {raw}: {e}")))
    }

    async fn call_api(&self, path: &str, params: &[(&str, String)]) -> Result<Value> {
        let api_key = self.config.require_api_key()?;
        let url = self.endpoint(path)?;

        tokio::time::sleep(self.config.request_delay).await;
        self.rate_limiter.until_ready().await;

        tracing::debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .query(params)
            .query(&[("apikey", api_key)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(StockError::ApiError(format!(
                "HTTP error: {}",
                response.status()
            )));
        }

        let data: Value = response.json().await?;
        check_api_error(&data)?;
        Ok(data)
    }
}

/// Reject a body whose `code` field is set to anything but a falsy value
///
/// Twelve Data reports quota and authentication failures this way while
/// still answering 200.
pub fn check_api_error(data: &Value) -> Result<()> {
    let flagged = match data.get("code") {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|v| v != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(a)) => !a.is_empty(),
        Some(Value::Object(o)) => !o.is_empty(),
    };

    if flagged {
        Err(StockError::ApiError(format!("TwelveData API error: {data}")))
    } else {
        Ok(())
    }
}

#[async_trait]
impl TimeSeriesSource for TwelveDataClient {
    async fn time_series(&self, request: &SeriesRequest) -> Result<Value> {
        let params = [
            ("symbol", request.symbol.clone()),
            ("interval", request.interval.clone()),
            ("outputsize", request.outputsize.to_string()),
            ("format", "JSON".to_string()),
        ];
        self.call_api("time_series", &params).await
    }

    async fn quote(&self, symbol: &str) -> Result<Value> {
        self.call_api("quote", &[("symbol", symbol.to_uppercase())])
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client(config: StockConfig) -> TwelveDataClient {
        TwelveDataClient::new(Arc::new(config)).unwrap()
    }

    #[test]
    fn test_endpoint() {
        let c = client(StockConfig::default());
        assert_eq!(
            c.endpoint("time_series").unwrap().as_str(),
            "https://api.twelvedata.com/time_series"
        );

        let c = client(
            StockConfig::builder()
                .base_url("http://localhost:8080/v1/")
                .build()
                .unwrap(),
        );
        assert_eq!(
            c.endpoint("quote").unwrap().as_str(),
            "http://localhost:8080/v1/quote"
        );
    }

    #[test]
    fn test_check_api_error() {
        assert!(check_api_error(&json!({"values": []})).is_ok());
        assert!(check_api_error(&json!({"code": 0})).is_ok());
        assert!(check_api_error(&json!({"code": null})).is_ok());

        let err = check_api_error(&json!({"code": 429, "message": "limit reached"})).unwrap_err();
        assert!(matches!(err, StockError::ApiError(_)));
        assert!(err.to_string().contains("limit reached"));
    }

    #[tokio::test]
    async fn test_missing_api_key_fails_before_request() {
        let c = client(StockConfig::default());
        let err = c
            .time_series(&SeriesRequest::new("AAPL", "1day", 30))
            .await
            .unwrap_err();

        match err {
            StockError::ConfigError(msg) => assert!(msg.contains("TWELVE_DATA_API_KEY")),
            other => panic!("expected ConfigError, got {other:?}"),
        }
    }
}
