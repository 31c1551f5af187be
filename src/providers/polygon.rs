use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, instrument};

use crate::core::price::{BulkHistory, BulkStats, MarketDataProvider};
use crate::core::series::{PricePoint, Series};

const USER_AGENT: &str = concat!("sectorscope/", env!("CARGO_PKG_VERSION"));

/// Daily aggregates from a Polygon-compatible API, plus an optional bulk
/// history endpoint that serves many symbols in one call.
pub struct PolygonProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    bulk_url: Option<String>,
}

impl PolygonProvider {
    pub fn new(base_url: &str, api_key: Option<String>, bulk_url: Option<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            bulk_url,
        })
    }

    fn aggregates_url(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> String {
        let mut url = format!(
            "{}/v2/aggs/ticker/{}/range/1/day/{}/{}?adjusted=true&sort=asc&limit=50000",
            self.base_url,
            symbol,
            start.format("%Y-%m-%d"),
            end.format("%Y-%m-%d")
        );
        if let Some(key) = &self.api_key {
            url.push_str("&apiKey=");
            url.push_str(key);
        }
        url
    }
}

#[derive(Deserialize, Debug)]
struct AggregatesResponse {
    results: Vec<AggregateBar>,
}

#[derive(Deserialize, Debug)]
struct AggregateBar {
    #[serde(alias = "t")]
    timestamp: i64,
    #[serde(alias = "c")]
    close: f64,
    #[serde(alias = "v", default)]
    volume: f64,
}

impl From<&AggregateBar> for PricePoint {
    fn from(bar: &AggregateBar) -> Self {
        PricePoint {
            timestamp: bar.timestamp,
            close: bar.close,
            volume: bar.volume.max(0.0) as u64,
        }
    }
}

fn to_series(symbol: &str, bars: &[AggregateBar]) -> Series {
    Series::new(symbol, bars.iter().map(PricePoint::from).collect())
}

#[derive(Serialize, Debug)]
struct BulkRequest<'a> {
    symbols: &'a [String],
    days: u32,
}

#[derive(Deserialize, Debug)]
struct BulkResponse {
    success: bool,
    #[serde(default)]
    data: HashMap<String, Vec<AggregateBar>>,
    stats: Option<BulkStats>,
}

#[async_trait]
impl MarketDataProvider for PolygonProvider {
    #[instrument(name = "BulkHistoryFetch", skip(self, symbols), fields(symbols = symbols.len()))]
    async fn fetch_bulk(&self, symbols: &[String], days: u32) -> Result<BulkHistory> {
        let url = self
            .bulk_url
            .as_deref()
            .ok_or_else(|| anyhow!("Bulk history endpoint not configured"))?;
        debug!("Requesting bulk history from {}", url);

        let response = self
            .client
            .post(url)
            .json(&BulkRequest { symbols, days })
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for bulk history URL: {}", e, url))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} for bulk history",
                response.status()
            ));
        }

        let text = response.text().await?;
        let body: BulkResponse = serde_json::from_str(&text)
            .map_err(|e| anyhow!("Failed to parse bulk history response: {}", e))?;

        let data: HashMap<String, Series> = body
            .data
            .iter()
            .map(|(symbol, bars)| (symbol.clone(), to_series(symbol, bars)))
            .collect();
        let stats = body.stats.unwrap_or(BulkStats {
            requested: symbols.len(),
            successful: data.len(),
        });

        Ok(BulkHistory {
            success: body.success,
            data,
            stats,
        })
    }

    #[instrument(name = "AggregatesFetch", skip(self), fields(symbol = %symbol))]
    async fn fetch_range(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<Series> {
        let url = self.aggregates_url(symbol, start, end);
        debug!("Requesting aggregates for {} from {} to {}", symbol, start, end);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for symbol: {}", e, symbol))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} for symbol: {}",
                response.status(),
                symbol
            ));
        }

        let text = response.text().await?;
        let data: AggregatesResponse = serde_json::from_str(&text)
            .map_err(|e| anyhow!("Failed to parse JSON response for {}: {}", symbol, e))?;

        Ok(to_series(symbol, &data.results))
    }
}
