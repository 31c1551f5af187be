use super::ui;
use crate::core::config::{API_KEY_ENV, AppConfig};
use anyhow::{Context, Result};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::Path;

const EXAMPLE_CONFIG: &str = include_str!("../../docs/example_config.yaml");

/// Writes the example configuration to the platform config directory and
/// prints what to do next.
pub fn setup() -> Result<()> {
    let path = AppConfig::default_config_path()?;
    setup_at_path(&path)?;

    println!(
        "Created configuration at {}",
        ui::style_text(&path.display().to_string(), ui::StyleType::Title)
    );
    let config = AppConfig::default();
    if config.providers.polygon.resolve_api_key().is_none() {
        println!(
            "{}",
            ui::style_text(
                &format!("Set providers.polygon.api_key in it, or export {API_KEY_ENV}"),
                ui::StyleType::Subtle
            )
        );
    }
    Ok(())
}

/// Writes the example configuration to `path`. An existing file is never
/// overwritten.
pub fn setup_at_path<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            anyhow::bail!("Configuration file already exists at {}", path.display())
        }
        Err(e) => {
            return Err(e)
                .with_context(|| format!("Failed to create config file: {}", path.display()));
        }
    };
    file.write_all(EXAMPLE_CONFIG.as_bytes())
        .with_context(|| format!("Failed to write config file to {}", path.display()))?;

    tracing::info!(path = %path.display(), "Wrote example configuration");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Catalog;
    use tempfile::TempDir;

    #[test]
    fn test_setup_writes_loadable_config() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("nested").join("config.yaml");

        setup_at_path(&config_path)?;

        let content = fs::read_to_string(&config_path)?;
        assert!(content.starts_with("# Example configuration file for sectorscope"));

        let config = AppConfig::load_from_path(&config_path)?;
        assert_eq!(config.catalog, Catalog::default_sectors());
        assert_eq!(config.analysis.timeframes.len(), 5);
        assert!(!config.bulk_outlives_timeframe());

        Ok(())
    }

    #[test]
    fn test_setup_keeps_existing_config() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("config.yaml");
        fs::write(&config_path, "top_n: 3")?;

        let err = setup_at_path(&config_path).unwrap_err();
        assert!(err.to_string().contains("already exists"));
        assert_eq!(fs::read_to_string(&config_path)?, "top_n: 3");

        Ok(())
    }

    #[test]
    fn test_example_timeouts_match_defaults() -> Result<()> {
        let config: AppConfig = serde_yaml::from_str(EXAMPLE_CONFIG)
            .context("Failed to parse example config as YAML")?;

        assert_eq!(config.fetch, AppConfig::default().fetch);
        assert_eq!(config.analysis, AppConfig::default().analysis);

        Ok(())
    }
}
