//! Path resolution for config and data directories.

use std::path::{Path, PathBuf};

use crate::cli::Cli;
use crate::config::{default_config_path, default_data_dir, read_config, HeartlineConfig};
use crate::constants::env_vars;
use crate::errors::CliError;

/// Resolve the config file path, checking HEARTLINE_CONFIG env var first.
pub fn resolve_config_path() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var(env_vars::CONFIG) {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value));
        }
    }
    default_config_path()
}

/// Load the config file, failing with a `heartline init` hint when missing.
pub fn load_config() -> anyhow::Result<HeartlineConfig> {
    let config_path = resolve_config_path()?;
    if !config_path.exists() {
        return Err(CliError::not_found(
            missing_config_message(&config_path),
            "Hint: Run `heartline init` to choose a shared ledger backend.",
        )
        .into());
    }
    read_config(&config_path).map_err(|e| {
        CliError::config_with_hint(
            e.to_string(),
            format!("Hint: Fix or remove {}", config_path.display()),
        )
        .into()
    })
}

/// Resolve the device data directory from CLI args, config, or XDG default.
pub fn resolve_data_dir(cli: &Cli, config: Option<&HeartlineConfig>) -> anyhow::Result<PathBuf> {
    if let Some(dir) = cli.data_dir.as_deref().filter(|d| !d.trim().is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    if let Some(dir) = config.and_then(|c| c.storage.data_dir.as_deref()) {
        return Ok(PathBuf::from(dir));
    }
    default_data_dir()
}

/// Error message when config file is missing.
pub fn missing_config_message(config_path: &Path) -> String {
    format!("No config found at {}", config_path.display())
}
