//! Scripted provider and clock for exercising the pipeline without a network.

use super::cache::Clock;
use super::price::{BulkHistory, BulkStats, MarketDataProvider};
use super::series::{PricePoint, Series};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

pub(crate) struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub(crate) fn advance(&self, by: chrono::Duration) {
        let mut now = self.now.lock().unwrap();
        *now += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self {
            now: Mutex::new(Utc.with_ymd_and_hms(2024, 6, 28, 16, 0, 0).unwrap()),
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BulkMode {
    Succeed,
    /// Responds with `success: false`.
    Reject,
    Error,
    /// Never responds.
    Hang,
}

/// In-memory provider with call counters and an in-flight gauge.
pub(crate) struct MockProvider {
    series: HashMap<String, Series>,
    pub(crate) bulk_mode: BulkMode,
    /// Bulk requests for these lookbacks never respond, whatever the mode.
    pub(crate) hang_bulk_days: HashSet<u32>,
    /// Per-symbol requests for these symbols never respond.
    pub(crate) hang_symbols: HashSet<String>,
    /// Per-symbol requests for these symbols fail.
    pub(crate) failing_symbols: HashSet<String>,
    pub(crate) range_latency: Duration,
    bulk_requests: Mutex<Vec<Vec<String>>>,
    range_calls: AtomicUsize,
    range_calls_by_symbol: Mutex<HashMap<String, usize>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl MockProvider {
    pub(crate) fn new(bulk_mode: BulkMode) -> Self {
        Self {
            series: HashMap::new(),
            bulk_mode,
            hang_bulk_days: HashSet::new(),
            hang_symbols: HashSet::new(),
            failing_symbols: HashSet::new(),
            range_latency: Duration::ZERO,
            bulk_requests: Mutex::new(Vec::new()),
            range_calls: AtomicUsize::new(0),
            range_calls_by_symbol: Mutex::new(HashMap::new()),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
        }
    }

    /// Registers daily closes, oldest first, one day apart.
    pub(crate) fn with_closes(mut self, symbol: &str, closes: &[f64]) -> Self {
        self.series
            .insert(symbol.to_string(), daily_series(symbol, closes));
        self
    }

    pub(crate) fn with_flat(self, symbols: &[&str]) -> Self {
        symbols
            .iter()
            .fold(self, |p, s| p.with_closes(s, &[10.0, 10.0]))
    }

    pub(crate) fn bulk_calls(&self) -> usize {
        self.bulk_requests.lock().unwrap().len()
    }

    /// Symbols carried by each bulk request, in call order.
    pub(crate) fn bulk_requests(&self) -> Vec<Vec<String>> {
        self.bulk_requests.lock().unwrap().clone()
    }

    pub(crate) fn range_calls(&self) -> usize {
        self.range_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn range_calls_for(&self, symbol: &str) -> usize {
        self.range_calls_by_symbol
            .lock()
            .unwrap()
            .get(symbol)
            .copied()
            .unwrap_or(0)
    }

    pub(crate) fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}

pub(crate) fn daily_series(symbol: &str, closes: &[f64]) -> Series {
    let points = closes
        .iter()
        .enumerate()
        .map(|(i, close)| PricePoint {
            timestamp: 1_719_000_000_000 + i as i64 * 86_400_000,
            close: *close,
            volume: 1_000_000,
        })
        .collect();
    Series::new(symbol, points)
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl MarketDataProvider for MockProvider {
    async fn fetch_bulk(&self, symbols: &[String], days: u32) -> Result<BulkHistory> {
        self.bulk_requests.lock().unwrap().push(symbols.to_vec());
        if self.hang_bulk_days.contains(&days) {
            std::future::pending::<()>().await;
        }
        match self.bulk_mode {
            BulkMode::Hang => std::future::pending().await,
            BulkMode::Error => Err(anyhow!("bulk endpoint unavailable")),
            BulkMode::Reject => Ok(BulkHistory {
                success: false,
                data: HashMap::new(),
                stats: BulkStats {
                    requested: symbols.len(),
                    successful: 0,
                },
            }),
            BulkMode::Succeed => {
                let data: HashMap<String, Series> = symbols
                    .iter()
                    .filter_map(|s| self.series.get(s).map(|series| (s.clone(), series.clone())))
                    .collect();
                Ok(BulkHistory {
                    success: true,
                    stats: BulkStats {
                        requested: symbols.len(),
                        successful: data.len(),
                    },
                    data,
                })
            }
        }
    }

    async fn fetch_range(&self, symbol: &str, _start: NaiveDate, _end: NaiveDate) -> Result<Series> {
        self.range_calls.fetch_add(1, Ordering::SeqCst);
        *self
            .range_calls_by_symbol
            .lock()
            .unwrap()
            .entry(symbol.to_string())
            .or_default() += 1;

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(current, Ordering::SeqCst);
        let _guard = InFlight(&self.in_flight);

        if self.hang_symbols.contains(symbol) {
            std::future::pending::<()>().await;
        }
        if !self.range_latency.is_zero() {
            tokio::time::sleep(self.range_latency).await;
        }
        if self.failing_symbols.contains(symbol) {
            return Err(anyhow!("HTTP error: 500 for symbol: {symbol}"));
        }
        self.series
            .get(symbol)
            .cloned()
            .ok_or_else(|| anyhow!("No price data found for symbol: {symbol}"))
    }
}
