//! Tool constructing a Hierarchical Risk Parity portfolio

use async_trait::async_trait;
use serde_json::Value;
use stock_core::Result as CoreResult;
use stock_tools::Tool;

use crate::analyzer::StockAnalyzer;
use crate::tools::params::{SymbolsRequest, error_payload, symbols_input_schema};

/// Symbol → weight allocation via HRP
pub struct HrpPortfolioTool {
    analyzer: StockAnalyzer,
}

impl HrpPortfolioTool {
    pub fn new(analyzer: StockAnalyzer) -> Self {
        Self { analyzer }
    }
}

#[async_trait]
impl Tool for HrpPortfolioTool {
    async fn execute(&self, params: Value) -> CoreResult<Value> {
        let request = match SymbolsRequest::from_params(&params) {
            Ok(request) => request,
            Err(message) => return Ok(error_payload(message)),
        };

        match self
            .analyzer
            .hierarchical_risk_parity_portfolio(
                &request.symbols,
                request.interval.as_deref(),
                request.outputsize,
            )
            .await
        {
            Ok(weights) => Ok(serde_json::to_value(weights)?),
            Err(e) => {
                tracing::warn!("HRP failed for {:?}: {}", request.symbols, e);
                Ok(error_payload(format!("Analysis failed: {e}")))
            },
        }
    }

    fn name(&self) -> &'static str {
        "hierarchical_risk_parity_portfolio"
    }

    fn description(&self) -> &'static str {
        "Construct a hierarchical risk parity portfolio: assets are clustered by \
         return correlation and risk is split top-down through the cluster tree."
    }

    fn input_schema(&self) -> Value {
        symbols_input_schema()
    }
}
