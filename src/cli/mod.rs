//! CLI command implementations for Claimgrid.

pub(crate) mod play;
pub(crate) mod run;
pub(crate) mod simulate;

mod output;

use clap::ValueEnum;
use std::error::Error;
use std::fmt;
use std::path::Path;

use claimgrid::config::GameConfig;

/// Output format for the `run` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Output format for the `simulate` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum SimulateFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON output.
    Json,
    /// CSV format.
    Csv,
}

/// Game settings shared by every command.
#[derive(Debug, Clone, Default)]
pub(crate) struct ConfigArgs {
    /// JSON config file.
    pub(crate) config: Option<std::path::PathBuf>,
    /// Override for `num_players`.
    pub(crate) players: Option<u8>,
    /// Override for `grid_size`.
    pub(crate) grid_size: Option<u16>,
}

impl ConfigArgs {
    /// Load the config file (or defaults) and apply overrides.
    pub(crate) fn resolve(&self) -> Result<GameConfig, CliError> {
        let mut config = match &self.config {
            Some(path) => load(path)?,
            None => GameConfig::default(),
        };
        if let Some(players) = self.players {
            config.num_players = players;
        }
        if let Some(grid_size) = self.grid_size {
            config.grid_size = grid_size;
        }
        config.validate().map_err(|e| CliError::new(e.to_string()))?;
        Ok(config)
    }
}

fn load(path: &Path) -> Result<GameConfig, CliError> {
    GameConfig::load(path).map_err(|e| CliError::new(e.to_string()))
}

/// CLI error type.
#[derive(Debug)]
pub(crate) struct CliError {
    message: String,
}

impl CliError {
    /// Create a new CLI error.
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for CliError {}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        Self::new(e.to_string())
    }
}

impl From<claimgrid::GameError> for CliError {
    fn from(e: claimgrid::GameError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<claimgrid::ConfigError> for CliError {
    fn from(e: claimgrid::ConfigError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::new(format!("JSON error: {e}"))
    }
}
