use super::fetcher::FetchOptions;
use super::instrument::Catalog;
use super::timeframe::{AnalyzerOptions, Timeframe};
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;
use std::{fs, path::PathBuf};
use tracing::{debug, warn};

pub const API_KEY_ENV: &str = "POLYGON_API_KEY";

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct PolygonProviderConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    /// Aggregated history endpoint; batched per-symbol requests are used when absent.
    pub bulk_url: Option<String>,
}

impl Default for PolygonProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.polygon.io".to_string(),
            api_key: None,
            bulk_url: None,
        }
    }
}

impl PolygonProviderConfig {
    /// Configured key, falling back to the `POLYGON_API_KEY` environment variable.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(API_KEY_ENV).ok())
            .filter(|key| !key.is_empty())
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub polygon: PolygonProviderConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct FetchConfig {
    pub batch_size: usize,
    pub max_concurrent_batches: usize,
    pub request_delay_ms: u64,
    pub group_delay_ms: u64,
    pub request_timeout_secs: u64,
    pub bulk_timeout_secs: u64,
    pub cache_ttl_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        let defaults = FetchOptions::default();
        Self {
            batch_size: defaults.batch_size,
            max_concurrent_batches: defaults.max_concurrent_batches,
            request_delay_ms: defaults.request_delay.as_millis() as u64,
            group_delay_ms: defaults.group_delay.as_millis() as u64,
            request_timeout_secs: defaults.request_timeout.as_secs(),
            bulk_timeout_secs: defaults.bulk_timeout.as_secs(),
            cache_ttl_secs: defaults.cache_ttl.as_secs(),
        }
    }
}

impl From<&FetchConfig> for FetchOptions {
    fn from(config: &FetchConfig) -> Self {
        Self {
            batch_size: config.batch_size.max(1),
            max_concurrent_batches: config.max_concurrent_batches.max(1),
            request_delay: Duration::from_millis(config.request_delay_ms),
            group_delay: Duration::from_millis(config.group_delay_ms),
            request_timeout: Duration::from_secs(config.request_timeout_secs),
            bulk_timeout: Duration::from_secs(config.bulk_timeout_secs),
            cache_ttl: Duration::from_secs(config.cache_ttl_secs),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct AnalysisConfig {
    pub timeframe_timeout_secs: u64,
    pub top_n: usize,
    pub timeframes: Vec<Timeframe>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        let defaults = AnalyzerOptions::default();
        Self {
            timeframe_timeout_secs: defaults.timeout.as_secs(),
            top_n: defaults.top_n,
            timeframes: Timeframe::defaults(),
        }
    }
}

impl From<&AnalysisConfig> for AnalyzerOptions {
    fn from(config: &AnalysisConfig) -> Self {
        Self {
            timeout: Duration::from_secs(config.timeframe_timeout_secs),
            top_n: config.top_n,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub catalog: Catalog,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("dev", "sectorscope", "sectorscope")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    /// Timeframe labels key the run results, so they must be unique.
    pub fn validate(&self) -> Result<()> {
        let mut labels = HashSet::new();
        for timeframe in &self.analysis.timeframes {
            if !labels.insert(timeframe.label.as_str()) {
                anyhow::bail!("Duplicate timeframe label: {}", timeframe.label);
            }
        }

        if self.bulk_outlives_timeframe() {
            warn!(
                bulk_timeout_secs = self.fetch.bulk_timeout_secs,
                timeframe_timeout_secs = self.analysis.timeframe_timeout_secs,
                "Bulk timeout is not shorter than the timeframe timeout, a hanging bulk endpoint will leave timeframes empty"
            );
        }
        Ok(())
    }

    /// True when a hanging bulk request would use up a timeframe's whole budget
    /// before per-symbol requests can start.
    pub fn bulk_outlives_timeframe(&self) -> bool {
        self.providers.polygon.bulk_url.is_some()
            && self.fetch.bulk_timeout_secs >= self.analysis.timeframe_timeout_secs
    }
}
