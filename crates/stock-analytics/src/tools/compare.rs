//! Tool comparing several symbols

use async_trait::async_trait;
use serde_json::Value;
use stock_core::Result as CoreResult;
use stock_tools::Tool;

use crate::analyzer::StockAnalyzer;
use crate::tools::params::{SymbolsRequest, error_payload, symbols_input_schema};

/// Per-symbol metrics and return correlation for a list of symbols
pub struct CompareStocksTool {
    analyzer: StockAnalyzer,
}

impl CompareStocksTool {
    pub fn new(analyzer: StockAnalyzer) -> Self {
        Self { analyzer }
    }
}

#[async_trait]
impl Tool for CompareStocksTool {
    async fn execute(&self, params: Value) -> CoreResult<Value> {
        let request = match SymbolsRequest::from_params(&params) {
            Ok(request) => request,
            Err(message) => return Ok(error_payload(message)),
        };

        match self
            .analyzer
            .compare_symbols(
                &request.symbols,
                request.interval.as_deref(),
                request.outputsize,
            )
            .await
        {
            Ok(report) => Ok(serde_json::to_value(report)?),
            Err(e) => {
                tracing::warn!("compare_stocks failed for {:?}: {}", request.symbols, e);
                Ok(error_payload(format!("Analysis failed: {e}")))
            },
        }
    }

    fn name(&self) -> &'static str {
        "compare_stocks"
    }

    fn description(&self) -> &'static str {
        "Compare multiple stock symbols with analysis. Fetches data and compares \
         performance, metrics, and trends."
    }

    fn input_schema(&self) -> Value {
        symbols_input_schema()
    }
}
