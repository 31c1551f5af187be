//! One end-to-end relative-performance analysis for a single lookback window.

use super::fetcher::SeriesFetcher;
use super::instrument::{Catalog, Instrument};
use super::performance::RelativePerformance;
use super::ranking::{HoldingRankEntry, rank_holdings, top_performers, worst_performers};
use super::series::Series;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{info, instrument, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeframe {
    pub label: String,
    pub lookback_days: u32,
}

impl Timeframe {
    pub fn new(label: &str, lookback_days: u32) -> Self {
        Self {
            label: label.to_string(),
            lookback_days,
        }
    }

    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new("1W", 5),
            Self::new("1M", 21),
            Self::new("3M", 63),
            Self::new("6M", 126),
            Self::new("1Y", 252),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstrumentAnalysis {
    pub instrument: Instrument,
    pub performance: RelativePerformance,
    pub top_holdings: Vec<HoldingRankEntry>,
    pub worst_holdings: Vec<HoldingRankEntry>,
}

/// Instruments for one lookback, best relative performance first. An empty
/// list means no data for the window, not an error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeframeAnalysis {
    pub label: String,
    pub lookback_days: u32,
    #[serde(rename = "industries")]
    pub instruments: Vec<InstrumentAnalysis>,
}

impl TimeframeAnalysis {
    pub fn empty(label: &str, lookback_days: u32) -> Self {
        Self {
            label: label.to_string(),
            lookback_days,
            instruments: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzerOptions {
    pub timeout: Duration,
    /// Holdings kept at each end of the ranking.
    pub top_n: usize,
}

impl Default for AnalyzerOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            top_n: 5,
        }
    }
}

pub struct TimeframeAnalyzer {
    catalog: Arc<Catalog>,
    fetcher: SeriesFetcher,
    options: AnalyzerOptions,
}

impl TimeframeAnalyzer {
    pub fn new(catalog: Arc<Catalog>, fetcher: SeriesFetcher, options: AnalyzerOptions) -> Self {
        Self {
            catalog,
            fetcher,
            options,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Analyzes one window. If the work outlives the timeout it is dropped,
    /// cancelling any in-flight requests, and an empty analysis is returned.
    pub async fn analyze_timeframe(&self, lookback_days: u32, label: &str) -> TimeframeAnalysis {
        self.try_analyze(lookback_days, label)
            .await
            .unwrap_or_else(|| TimeframeAnalysis::empty(label, lookback_days))
    }

    /// Same as [`Self::analyze_timeframe`] but `None` on timeout.
    #[instrument(name = "AnalyzeTimeframe", skip(self))]
    pub(crate) async fn try_analyze(
        &self,
        lookback_days: u32,
        label: &str,
    ) -> Option<TimeframeAnalysis> {
        match timeout(self.options.timeout, self.analyze(lookback_days, label)).await {
            Ok(analysis) => {
                info!(instruments = analysis.instruments.len(), "Timeframe analyzed");
                Some(analysis)
            }
            Err(_) => {
                warn!(
                    timeout_secs = self.options.timeout.as_secs(),
                    "Timeframe analysis timed out"
                );
                None
            }
        }
    }

    async fn analyze(&self, lookback_days: u32, label: &str) -> TimeframeAnalysis {
        let universe = self.catalog.universe();
        let series = self.fetcher.fetch_all(&universe, lookback_days).await;
        build_analysis(&self.catalog, &series, label, lookback_days, self.options.top_n)
    }
}

/// Scores every instrument that has data against the benchmark and ranks its
/// holdings. Instruments without a resolved series are left out; without a
/// benchmark series nothing can be scored.
pub fn build_analysis(
    catalog: &Catalog,
    series: &HashMap<String, Series>,
    label: &str,
    lookback_days: u32,
    top_n: usize,
) -> TimeframeAnalysis {
    let resolved = |symbol: &str| series.get(symbol).filter(|s| !s.is_empty());

    let Some(benchmark) = resolved(catalog.benchmark.as_str()) else {
        warn!(benchmark = %catalog.benchmark, label, "No benchmark series, skipping timeframe");
        return TimeframeAnalysis::empty(label, lookback_days);
    };

    let mut instruments: Vec<InstrumentAnalysis> = catalog
        .instruments
        .iter()
        .filter_map(|instrument| {
            let own = resolved(instrument.symbol.as_str())?;
            let ranked = rank_holdings(instrument, own, series);
            Some(InstrumentAnalysis {
                instrument: instrument.clone(),
                performance: RelativePerformance::compute(own, benchmark),
                top_holdings: top_performers(&ranked, top_n),
                worst_holdings: worst_performers(&ranked, top_n),
            })
        })
        .collect();
    instruments.sort_by(|a, b| b.performance.value.total_cmp(&a.performance.value));

    TimeframeAnalysis {
        label: label.to_string(),
        lookback_days,
        instruments,
    }
}
