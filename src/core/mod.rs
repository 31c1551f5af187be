//! Relative-performance pipeline: catalog, fetching, scoring and orchestration

pub mod cache;
pub mod config;
pub mod fetcher;
pub mod instrument;
pub mod log;
pub mod performance;
pub mod price;
pub mod ranking;
pub mod run;
pub mod series;
pub mod timeframe;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export main types for cleaner imports
pub use cache::{Clock, SystemClock};
pub use fetcher::{FetchOptions, SeriesFetcher};
pub use instrument::{Catalog, Instrument};
pub use price::{BulkHistory, BulkStats, MarketDataProvider};
pub use run::{AnalysisRun, RunCoordinator};
pub use series::{PricePoint, Series};
pub use timeframe::{AnalyzerOptions, Timeframe, TimeframeAnalysis, TimeframeAnalyzer};
