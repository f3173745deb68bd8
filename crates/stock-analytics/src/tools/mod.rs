//! Tool-call surface of the analytics crate

pub mod compare;
pub mod health;
pub mod hrp;
pub mod params;

pub use compare::CompareStocksTool;
pub use health::{HealthCheckTool, health_status};
pub use hrp::HrpPortfolioTool;
pub use params::SymbolsRequest;

use std::sync::Arc;
use stock_tools::ToolRegistry;

use crate::analyzer::StockAnalyzer;

/// Register the comparison, HRP and health tools
pub fn register_tools(registry: &ToolRegistry, analyzer: &StockAnalyzer) {
    registry.register(Arc::new(CompareStocksTool::new(analyzer.clone())));
    registry.register(Arc::new(HrpPortfolioTool::new(analyzer.clone())));
    registry.register(Arc::new(HealthCheckTool));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::config::StockConfig;
    use crate::data::MarketDataFetcher;
    use crate::data::source::MockTimeSeriesSource;
    use std::time::Duration;
    use stock_tools::Tool;

    #[test]
    fn test_register_tools() {
        let analyzer = StockAnalyzer::new(MarketDataFetcher::new(
            Arc::new(MockTimeSeriesSource::new()),
            Arc::new(MemoryCache::new(Duration::from_secs(60))),
            Arc::new(StockConfig::default()),
        ));
        let registry = ToolRegistry::new();
        register_tools(&registry, &analyzer);

        let names: Vec<String> = registry
            .list_tools()
            .iter()
            .map(|t| t.name().to_string())
            .collect();
        assert_eq!(
            names,
            ["compare_stocks", "health_check", "hierarchical_risk_parity_portfolio"]
        );
    }
}
