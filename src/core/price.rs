//! Market data provider abstraction

use super::series::Series;
use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkStats {
    pub requested: usize,
    pub successful: usize,
}

/// Result of one aggregated request for many symbols.
#[derive(Debug, Clone, Default)]
pub struct BulkHistory {
    pub success: bool,
    pub data: HashMap<String, Series>,
    pub stats: BulkStats,
}

#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Daily history for every symbol over the last `days` trading days in a
    /// single request.
    async fn fetch_bulk(&self, symbols: &[String], days: u32) -> Result<BulkHistory>;

    /// Daily history for one symbol between two calendar dates, inclusive.
    async fn fetch_range(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<Series>;
}
