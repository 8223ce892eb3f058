//! Application context for the Heartline CLI.
//!
//! Provides a unified context that combines CLI arguments with the
//! lazily-loaded config and game.

use std::path::PathBuf;
use std::sync::Arc;

use chrono_tz::Tz;
use log::warn;
use once_cell::unsync::OnceCell;

use heartline_core::storage::FileStore;
use heartline_core::Game;

use crate::cli::{Cli, OutputArgs};
use crate::config::HeartlineConfig;
use crate::errors::CliError;
use crate::ui::{OutputMode, UiContext};

use super::backend::{ledger_client, sync_policy};
use super::resolver::{load_config, resolve_data_dir};

/// Application context that bundles CLI args with configuration.
///
/// This avoids repeatedly loading config and threading multiple parameters
/// through handler functions.
pub struct AppContext<'a> {
    cli: &'a Cli,
    config: OnceCell<HeartlineConfig>,
    game: OnceCell<Game>,
}

impl<'a> AppContext<'a> {
    /// Create a new application context from CLI arguments.
    pub fn new(cli: &'a Cli) -> Self {
        Self {
            cli,
            config: OnceCell::new(),
            game: OnceCell::new(),
        }
    }

    /// Get the CLI arguments.
    pub fn cli(&self) -> &Cli {
        self.cli
    }

    /// Check if quiet mode is enabled.
    pub fn quiet(&self) -> bool {
        self.cli.quiet
    }

    /// Get the configuration, loading it lazily if needed.
    pub fn config(&self) -> anyhow::Result<&HeartlineConfig> {
        self.config.get_or_try_init(load_config)
    }

    /// Directory holding this device's identity and history.
    pub fn data_dir(&self) -> anyhow::Result<PathBuf> {
        resolve_data_dir(self.cli, Some(self.config()?))
    }

    /// Get the game, opening storage and the shared ledger on first use.
    pub fn game(&self) -> anyhow::Result<&Game> {
        self.game.get_or_try_init(|| {
            let config = self.config()?;
            let local = Arc::new(FileStore::open(self.data_dir()?)?);
            let client = ledger_client(config, local.clone(), self.cli.offline)?;
            Ok(Game::new(local, client, sync_policy(config)))
        })
    }

    /// Configured display timezone, if valid.
    pub fn timezone(&self) -> Option<Tz> {
        let name = self.config().ok()?.ui.timezone.as_deref()?;
        match name.parse::<Tz>() {
            Ok(tz) => Some(tz),
            Err(_) => {
                warn!("Ignoring unknown timezone in config: {}", name);
                None
            }
        }
    }

    /// Create a UI context from output flags.
    pub fn ui_context(&self, json: bool, format: Option<&str>) -> UiContext {
        UiContext::from_env(json, format, self.cli.no_color, self.cli.ascii)
    }

    /// Create a UI context from a command's output args, rejecting unknown
    /// `--format` values.
    pub fn ui_for(&self, output: &OutputArgs) -> anyhow::Result<UiContext> {
        if let Some(format) = output.format.as_deref() {
            OutputMode::validate_format(format).map_err(CliError::invalid_input)?;
        }
        Ok(self.ui_context(output.json, output.format.as_deref()))
    }
}
