pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::core::config::AppConfig;
use crate::core::{AnalyzerOptions, FetchOptions, RunCoordinator, SeriesFetcher, TimeframeAnalyzer};
use crate::providers::polygon::PolygonProvider;
use crate::store::SeriesCache;
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub enum AppCommand {
    Analyze {
        lookback_days: u32,
        label: Option<String>,
        json: bool,
    },
    Run {
        json: bool,
    },
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("sectorscope starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let cache = Arc::new(SeriesCache::new());
    let coordinator = build_coordinator(&config, cache)?;

    match command {
        AppCommand::Analyze {
            lookback_days,
            label,
            json,
        } => {
            let label = label.unwrap_or_else(|| default_label(&config, lookback_days));
            cli::analyze::run(coordinator.analyzer(), lookback_days, &label, json).await
        }
        AppCommand::Run { json } => cli::run::run(&coordinator, json).await,
    }
}

/// Wires the provider, the shared cache and the analysis settings together.
pub fn build_coordinator(config: &AppConfig, cache: Arc<SeriesCache>) -> Result<RunCoordinator> {
    let polygon = &config.providers.polygon;
    let api_key = polygon.resolve_api_key();
    if api_key.is_none() {
        warn!(
            "No API key configured, set providers.polygon.api_key or {}",
            crate::core::config::API_KEY_ENV
        );
    }
    let provider = PolygonProvider::new(&polygon.base_url, api_key, polygon.bulk_url.clone())?;

    let fetcher = SeriesFetcher::new(Arc::new(provider), cache, FetchOptions::from(&config.fetch));
    let analyzer = TimeframeAnalyzer::new(
        Arc::new(config.catalog.clone()),
        fetcher,
        AnalyzerOptions::from(&config.analysis),
    );
    Ok(RunCoordinator::new(
        analyzer,
        config.analysis.timeframes.clone(),
    ))
}

/// Label of the configured timeframe with this lookback, or `<days>D`.
fn default_label(config: &AppConfig, lookback_days: u32) -> String {
    config
        .analysis
        .timeframes
        .iter()
        .find(|t| t.lookback_days == lookback_days)
        .map(|t| t.label.clone())
        .unwrap_or_else(|| format!("{lookback_days}D"))
}
