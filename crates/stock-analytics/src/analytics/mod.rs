//! Analytics pipeline: series → panels → metrics, correlation, HRP weights
//!
//! Missing observations are `None` everywhere. Arithmetic involving a missing
//! value yields a missing value; aggregations skip missing values.

pub mod cluster;
pub mod correlation;
pub mod hrp;
pub mod metrics;
pub mod panel;
pub mod series;

pub use correlation::{CorrelationMatrix, correlation_matrix};
pub use hrp::{equal_weights, hrp_weights};
pub use metrics::{SymbolMetrics, compute_metrics, is_daily_interval};
pub use panel::{Panel, PanelBuilder};
pub use series::PriceSeries;
