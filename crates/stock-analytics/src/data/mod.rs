//! Market data boundary: payload validation, sources, and cached fetching

pub mod fetcher;
pub mod payload;
pub mod source;

pub use fetcher::MarketDataFetcher;
pub use payload::{FetchResult, ObservationKey, RawSeries, RawSeriesPoint};
pub use source::{SeriesRequest, TimeSeriesSource};
