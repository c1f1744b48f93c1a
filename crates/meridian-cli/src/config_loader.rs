//! Configuration loading utilities for CLI commands

use anyhow::{Context, Result};
use meridian_core::config::{CliConfigOverrides, LayeredConfig};
use std::path::{Path, PathBuf};

/// Default configuration file, looked up in the current directory
pub const DEFAULT_CONFIG_FILE: &str = "meridian.toml";

/// Load layered configuration from an explicit file, or `meridian.toml` when present
pub fn load_config(config_path: Option<&Path>) -> Result<LayeredConfig> {
    let mut config = LayeredConfig::with_defaults();

    match config_path {
        Some(path) => {
            config = config
                .load_from_file(path)
                .with_context(|| format!("Failed to load configuration file {}", path.display()))?;
        }
        None => {
            let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
            if default_path.is_file() {
                config = config
                    .load_from_file(&default_path)
                    .context("Failed to load configuration file")?;
            }
        }
    }

    Ok(config.load_from_env())
}

/// Load layered configuration with CLI overrides
pub fn load_config_with_overrides(
    config_path: Option<&Path>,
    overrides: CliConfigOverrides,
) -> Result<LayeredConfig> {
    let mut config = load_config(config_path)?;
    config.update_from_cli(overrides);
    Ok(config)
}
