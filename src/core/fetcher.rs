//! Resolves a set of symbols to price series through the cache and a
//! rate-limited provider.
//!
//! Uncached symbols are first requested in a single bulk call. If that call
//! errors, times out or reports failure, they are fetched one by one in
//! fixed-size batches: up to `max_concurrent_batches` batches are awaited
//! together, requests inside a batch start `request_delay` apart, and each
//! group of batches is followed by `group_delay` before the next one starts.
//! At most `batch_size * max_concurrent_batches` per-symbol requests are ever
//! outstanding.
//!
//! Nothing here returns an error. A symbol that cannot be resolved comes back
//! absent (bulk path) or as an empty series (batched path).

use super::cache::SeriesKey;
use super::price::MarketDataProvider;
use super::series::{DateRange, Series};
use crate::store::SeriesCache;
use futures::future::join_all;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOptions {
    pub batch_size: usize,
    pub max_concurrent_batches: usize,
    /// Stagger between request starts within one batch.
    pub request_delay: Duration,
    /// Pause between consecutive groups of concurrent batches.
    pub group_delay: Duration,
    pub request_timeout: Duration,
    pub bulk_timeout: Duration,
    pub cache_ttl: Duration,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            batch_size: 5,
            max_concurrent_batches: 2,
            request_delay: Duration::from_millis(200),
            group_delay: Duration::from_millis(1000),
            request_timeout: Duration::from_secs(10),
            bulk_timeout: Duration::from_secs(30),
            cache_ttl: Duration::from_secs(600),
        }
    }
}

pub struct SeriesFetcher {
    provider: Arc<dyn MarketDataProvider>,
    cache: Arc<SeriesCache>,
    options: FetchOptions,
}

impl SeriesFetcher {
    pub fn new(
        provider: Arc<dyn MarketDataProvider>,
        cache: Arc<SeriesCache>,
        options: FetchOptions,
    ) -> Self {
        Self {
            provider,
            cache,
            options,
        }
    }

    pub fn options(&self) -> &FetchOptions {
        &self.options
    }

    #[instrument(name = "FetchAll", skip(self, symbols), fields(symbols = symbols.len()))]
    pub async fn fetch_all(
        &self,
        symbols: &BTreeSet<String>,
        lookback_days: u32,
    ) -> HashMap<String, Series> {
        let range = DateRange::for_lookback(self.cache.clock().today(), lookback_days);

        let mut resolved = HashMap::with_capacity(symbols.len());
        let mut uncached = Vec::new();
        for symbol in symbols {
            match self.cache.get(&SeriesKey::new(symbol, range)) {
                Some(series) => {
                    resolved.insert(symbol.clone(), series);
                }
                None => uncached.push(symbol.clone()),
            }
        }
        debug!(
            cached = resolved.len(),
            uncached = uncached.len(),
            "Partitioned symbols by cache state"
        );

        if uncached.is_empty() {
            return resolved;
        }

        let fetched = match self.fetch_bulk(&uncached, lookback_days, range).await {
            Some(fetched) => fetched,
            None => self.fetch_batched(&uncached, range).await,
        };
        resolved.extend(fetched);
        resolved
    }

    /// Returns `None` when the bulk endpoint cannot be relied on for this call.
    async fn fetch_bulk(
        &self,
        symbols: &[String],
        lookback_days: u32,
        range: DateRange,
    ) -> Option<HashMap<String, Series>> {
        let response = match timeout(
            self.options.bulk_timeout,
            self.provider.fetch_bulk(symbols, lookback_days),
        )
        .await
        {
            Ok(Ok(response)) if response.success => response,
            Ok(Ok(response)) => {
                warn!(
                    requested = response.stats.requested,
                    successful = response.stats.successful,
                    "Bulk request reported failure, falling back to batched requests"
                );
                return None;
            }
            Ok(Err(e)) => {
                warn!(error = %e, "Bulk request failed, falling back to batched requests");
                return None;
            }
            Err(_) => {
                warn!(
                    timeout_secs = self.options.bulk_timeout.as_secs(),
                    "Bulk request timed out, falling back to batched requests"
                );
                return None;
            }
        };

        info!(
            requested = response.stats.requested,
            successful = response.stats.successful,
            "Bulk request succeeded"
        );

        let requested: HashSet<&str> = symbols.iter().map(String::as_str).collect();
        let fetched = response
            .data
            .into_iter()
            .filter(|(symbol, _)| requested.contains(symbol.as_str()))
            .inspect(|(symbol, series)| self.store(symbol, range, series))
            .collect();
        Some(fetched)
    }

    async fn fetch_batched(&self, symbols: &[String], range: DateRange) -> HashMap<String, Series> {
        let batches: Vec<&[String]> = symbols.chunks(self.options.batch_size.max(1)).collect();
        let groups: Vec<&[&[String]]> = batches
            .chunks(self.options.max_concurrent_batches.max(1))
            .collect();
        info!(
            symbols = symbols.len(),
            batches = batches.len(),
            groups = groups.len(),
            "Fetching series in batches"
        );

        let mut fetched = HashMap::with_capacity(symbols.len());
        for (index, group) in groups.iter().enumerate() {
            if index > 0 && !self.options.group_delay.is_zero() {
                sleep(self.options.group_delay).await;
            }
            let results = join_all(group.iter().map(|batch| self.fetch_batch(batch, range))).await;
            fetched.extend(results.into_iter().flatten());
        }

        let resolved = fetched.values().filter(|s| !s.is_empty()).count();
        info!(
            requested = symbols.len(),
            resolved, "Batched fetch complete"
        );
        fetched
    }

    async fn fetch_batch(&self, batch: &[String], range: DateRange) -> Vec<(String, Series)> {
        let requests = batch.iter().enumerate().map(|(index, symbol)| async move {
            let delay = self.options.request_delay * index as u32;
            if !delay.is_zero() {
                sleep(delay).await;
            }
            (symbol.clone(), self.fetch_one(symbol, range).await)
        });
        join_all(requests).await
    }

    async fn fetch_one(&self, symbol: &str, range: DateRange) -> Series {
        match timeout(
            self.options.request_timeout,
            self.provider.fetch_range(symbol, range.start, range.end),
        )
        .await
        {
            Ok(Ok(series)) => {
                self.store(symbol, range, &series);
                series
            }
            Ok(Err(e)) => {
                debug!(symbol, error = %e, "Series request failed");
                Series::empty(symbol)
            }
            Err(_) => {
                debug!(symbol, "Series request timed out");
                Series::empty(symbol)
            }
        }
    }

    fn store(&self, symbol: &str, range: DateRange, series: &Series) {
        if !series.is_empty() {
            self.cache.put(
                SeriesKey::new(symbol, range),
                series.clone(),
                self.options.cache_ttl,
            );
        }
    }
}
