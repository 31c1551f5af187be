//! Runs the timeframe analysis across every configured lookback in turn.

use super::timeframe::{Timeframe, TimeframeAnalysis, TimeframeAnalyzer};
use serde::ser::{Serialize, Serializer};
use tracing::{info, instrument};

/// Called after each timeframe with a stage description and percent complete.
pub type ProgressCallback<'a> = &'a (dyn Fn(&str, f64) + Send + Sync);
/// Called with each timeframe's analysis as soon as it is available.
pub type StreamCallback<'a> = &'a (dyn Fn(&str, &TimeframeAnalysis) + Send + Sync);

/// Analyses for every configured timeframe, in configured order. Serializes as
/// a map from label to analysis.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AnalysisRun {
    timeframes: Vec<TimeframeAnalysis>,
}

impl AnalysisRun {
    pub fn get(&self, label: &str) -> Option<&TimeframeAnalysis> {
        self.timeframes.iter().find(|t| t.label == label)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.timeframes.iter().map(|t| t.label.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &TimeframeAnalysis> {
        self.timeframes.iter()
    }

    pub fn len(&self) -> usize {
        self.timeframes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timeframes.is_empty()
    }
}

impl Serialize for AnalysisRun {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.timeframes.iter().map(|t| (&t.label, t)))
    }
}

pub struct RunCoordinator {
    analyzer: TimeframeAnalyzer,
    timeframes: Vec<Timeframe>,
}

impl RunCoordinator {
    pub fn new(analyzer: TimeframeAnalyzer, timeframes: Vec<Timeframe>) -> Self {
        Self {
            analyzer,
            timeframes,
        }
    }

    pub fn analyzer(&self) -> &TimeframeAnalyzer {
        &self.analyzer
    }

    pub fn timeframes(&self) -> &[Timeframe] {
        &self.timeframes
    }

    /// Timeframes are strictly sequential: the next fetch starts only after the
    /// previous timeframe resolved or timed out, which caps outstanding
    /// provider requests at a single timeframe's batch limit.
    #[instrument(name = "RunAnalysis", skip_all, fields(timeframes = self.timeframes.len()))]
    pub async fn run_analysis(
        &self,
        progress: Option<ProgressCallback<'_>>,
        stream: Option<StreamCallback<'_>>,
    ) -> AnalysisRun {
        let total = self.timeframes.len();
        let mut run = AnalysisRun {
            timeframes: Vec::with_capacity(total),
        };

        for (index, timeframe) in self.timeframes.iter().enumerate() {
            let label = timeframe.label.as_str();
            let (analysis, stage) = match self
                .analyzer
                .try_analyze(timeframe.lookback_days, label)
                .await
            {
                Some(analysis) => {
                    let stage = format!(
                        "Analyzed {label}: {} instruments ({}/{total})",
                        analysis.instruments.len(),
                        index + 1
                    );
                    (analysis, stage)
                }
                None => (
                    TimeframeAnalysis::empty(label, timeframe.lookback_days),
                    format!("Timed out on {label} ({}/{total})", index + 1),
                ),
            };

            if let Some(stream) = stream {
                stream(label, &analysis);
            }
            if let Some(progress) = progress {
                progress(&stage, (index + 1) as f64 * 100.0 / total as f64);
            }
            run.timeframes.push(analysis);
        }

        info!(timeframes = run.len(), "Analysis run complete");
        run
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fetcher::{FetchOptions, SeriesFetcher};
    use crate::core::instrument::{Catalog, Instrument};
    use crate::core::test_support::{BulkMode, ManualClock, MockProvider};
    use crate::core::timeframe::AnalyzerOptions;
    use crate::store::SeriesCache;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tokio::time::Instant;

    fn coordinator(provider: Arc<MockProvider>, timeframes: Vec<Timeframe>) -> RunCoordinator {
        let catalog = Catalog {
            benchmark: "SPY".to_string(),
            instruments: vec![
                Instrument::new("XLK", "Tech", "sector", &["AAPL"]),
                Instrument::new("XLE", "Energy", "sector", &["XOM"]),
            ],
        };
        let cache = Arc::new(SeriesCache::with_clock(Arc::new(ManualClock::default())));
        let fetch_options = FetchOptions {
            bulk_timeout: Duration::from_secs(600),
            ..FetchOptions::default()
        };
        let fetcher = SeriesFetcher::new(provider, cache, fetch_options);
        let analyzer =
            TimeframeAnalyzer::new(Arc::new(catalog), fetcher, AnalyzerOptions::default());
        RunCoordinator::new(analyzer, timeframes)
    }

    fn provider() -> MockProvider {
        MockProvider::new(BulkMode::Succeed)
            .with_closes("SPY", &[100.0, 101.0])
            .with_closes("XLK", &[100.0, 104.0])
            .with_closes("XLE", &[100.0, 97.0])
            .with_closes("AAPL", &[10.0, 11.0])
            .with_closes("XOM", &[10.0, 9.0])
    }

    #[tokio::test]
    async fn test_run_streams_each_timeframe_in_order() {
        let coordinator = coordinator(Arc::new(provider()), Timeframe::defaults());
        let streamed = Mutex::new(Vec::new());
        let progress = Mutex::new(Vec::new());

        let run = coordinator
            .run_analysis(
                Some(&|stage: &str, pct: f64| progress.lock().unwrap().push((stage.to_string(), pct))),
                Some(&|label: &str, analysis: &TimeframeAnalysis| {
                    streamed
                        .lock()
                        .unwrap()
                        .push((label.to_string(), analysis.instruments.len()))
                }),
            )
            .await;

        let labels: Vec<&str> = run.labels().collect();
        assert_eq!(labels, vec!["1W", "1M", "3M", "6M", "1Y"]);
        assert!(run.iter().all(|t| t.instruments.len() == 2));

        let streamed = streamed.into_inner().unwrap();
        assert_eq!(
            streamed,
            vec![
                ("1W".to_string(), 2),
                ("1M".to_string(), 2),
                ("3M".to_string(), 2),
                ("6M".to_string(), 2),
                ("1Y".to_string(), 2),
            ]
        );

        let progress = progress.into_inner().unwrap();
        let pcts: Vec<f64> = progress.iter().map(|(_, pct)| *pct).collect();
        assert_eq!(pcts, vec![20.0, 40.0, 60.0, 80.0, 100.0]);
        assert_eq!(progress[0].0, "Analyzed 1W: 2 instruments (1/5)");
    }

    #[tokio::test]
    async fn test_run_without_callbacks() {
        let coordinator = coordinator(
            Arc::new(provider()),
            vec![Timeframe::new("1M", 21), Timeframe::new("1Y", 252)],
        );

        let run = coordinator.run_analysis(None, None).await;

        assert_eq!(run.len(), 2);
        let xlk = &run.get("1Y").unwrap().instruments[0];
        assert_eq!(xlk.instrument.symbol, "XLK");
        assert!((xlk.performance.value - 3.0).abs() < 1e-9);
        assert!(run.get("5Y").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timed_out_timeframe_is_empty_and_run_continues() {
        let mut provider = provider();
        provider.hang_bulk_days.insert(5);
        let coordinator = coordinator(
            Arc::new(provider),
            vec![Timeframe::new("1W", 5), Timeframe::new("1M", 21)],
        );
        let stages = Mutex::new(Vec::new());

        let started = Instant::now();
        let run = coordinator
            .run_analysis(
                Some(&|stage: &str, _pct: f64| stages.lock().unwrap().push(stage.to_string())),
                None,
            )
            .await;

        assert!(started.elapsed() < Duration::from_secs(61));
        assert!(run.get("1W").unwrap().is_empty());
        assert_eq!(run.get("1M").unwrap().instruments.len(), 2);

        let stages = stages.into_inner().unwrap();
        assert_eq!(stages[0], "Timed out on 1W (1/2)");
        assert_eq!(stages[1], "Analyzed 1M: 2 instruments (2/2)");
    }

    #[tokio::test]
    async fn test_run_serializes_as_label_map() {
        let coordinator = coordinator(Arc::new(provider()), vec![Timeframe::new("1M", 21)]);
        let run = coordinator.run_analysis(None, None).await;

        let json = serde_json::to_value(&run).unwrap();
        let industries = json["1M"]["industries"].as_array().unwrap();
        assert_eq!(industries.len(), 2);
        assert_eq!(industries[0]["performance"]["trend"], "bullish");
        assert_eq!(industries[1]["performance"]["trend"], "bearish");
    }
}
