//! Multi-symbol comparison and portfolio construction

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::analytics::{
    Panel, PanelBuilder, SymbolMetrics, compute_metrics, correlation_matrix, equal_weights,
    hrp_weights,
};
use crate::data::MarketDataFetcher;
use crate::error::Result;

/// Result of comparing a set of symbols
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    /// Per-symbol statistics keyed by upper-cased symbol
    pub metrics: BTreeMap<String, SymbolMetrics>,
    /// Symmetric return correlation, rounded to 4 decimals
    pub correlation: BTreeMap<String, BTreeMap<String, f64>>,
}

/// Runs the analytics pipeline over fetched price series
///
/// Holds no state between calls other than what the fetcher's cache keeps.
#[derive(Clone)]
pub struct StockAnalyzer {
    fetcher: MarketDataFetcher,
}

impl StockAnalyzer {
    pub fn new(fetcher: MarketDataFetcher) -> Self {
        Self { fetcher }
    }

    pub fn fetcher(&self) -> &MarketDataFetcher {
        &self.fetcher
    }

    /// Fetch every symbol and align the closes into one price panel
    ///
    /// Symbols are fetched one after another so the source's request pacing
    /// holds. A repeated symbol is fetched once. The first failing symbol
    /// aborts the whole batch.
    pub async fn load_prices(
        &self,
        symbols: &[String],
        interval: Option<&str>,
        outputsize: Option<u32>,
    ) -> Result<Panel> {
        let mut builder = PanelBuilder::new();
        let mut seen = Vec::with_capacity(symbols.len());

        for symbol in symbols {
            let request = self.fetcher.request(symbol, interval, outputsize);
            if seen.contains(&request.symbol) {
                continue;
            }
            let series = self.fetcher.fetch_series(&request).await?;
            seen.push(request.symbol);
            builder.insert(series);
        }

        Ok(builder.build())
    }

    /// Per-symbol metrics and the return correlation matrix
    pub async fn compare_symbols(
        &self,
        symbols: &[String],
        interval: Option<&str>,
        outputsize: Option<u32>,
    ) -> Result<ComparisonReport> {
        let interval = interval.filter(|i| !i.is_empty());
        let prices = self.load_prices(symbols, interval, outputsize).await?;
        if prices.n_columns() == 0 {
            return Ok(ComparisonReport::default());
        }

        let returns = prices.pct_change();
        tracing::debug!(
            "Comparing {} symbols over {} price rows",
            prices.n_columns(),
            prices.n_rows()
        );

        Ok(ComparisonReport {
            metrics: compute_metrics(&prices, &returns, interval),
            correlation: correlation_matrix(&returns).to_rounded_map(),
        })
    }

    /// Hierarchical Risk Parity weights for the requested symbols
    ///
    /// Falls back to `1/N` over the requested list (repeats included) when
    /// the returns panel is empty or has fewer than two columns.
    pub async fn hierarchical_risk_parity_portfolio(
        &self,
        symbols: &[String],
        interval: Option<&str>,
        outputsize: Option<u32>,
    ) -> Result<BTreeMap<String, f64>> {
        let prices = self.load_prices(symbols, interval, outputsize).await?;
        if prices.n_columns() == 0 {
            return Ok(BTreeMap::new());
        }

        let returns = prices.pct_change();
        if returns.is_empty() || returns.n_columns() < 2 {
            tracing::debug!("Too little data for HRP, using equal weights");
            let requested: Vec<String> = symbols.iter().map(|s| s.trim().to_uppercase()).collect();
            return Ok(equal_weights(&requested));
        }

        hrp_weights(&returns)
    }
}
