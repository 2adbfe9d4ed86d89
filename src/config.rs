//! Game configuration.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::game::{
    ClusterStrategy, ColorScheme, DEFAULT_CLAIM_COST, DEFAULT_COMMISSION_PERCENT,
    DEFAULT_GRID_SIZE, DEFAULT_NUM_PLAYERS, DEFAULT_SWAP_COST, GridTopology, Pricing,
};

/// Everything needed to start a game.
///
/// Missing fields fall back to their defaults when deserializing, and unknown
/// fields are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameConfig {
    /// Side length of the square grid.
    pub grid_size: u16,
    /// Number of players.
    pub num_players: u8,
    /// Cost of claiming a cell.
    pub claim_cost: f64,
    /// Cost of a swap.
    pub swap_cost: f64,
    /// Share of every fee sent to the treasury, in percent.
    pub commission_percent: f64,
    /// How new clusters are colored.
    pub color_scheme: ColorScheme,
    /// Seed for random cluster colors.
    pub color_seed: u64,
    /// How the claimant's clusters are updated after a claim.
    pub cluster_strategy: ClusterStrategy,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid_size: DEFAULT_GRID_SIZE,
            num_players: DEFAULT_NUM_PLAYERS,
            claim_cost: DEFAULT_CLAIM_COST,
            swap_cost: DEFAULT_SWAP_COST,
            commission_percent: DEFAULT_COMMISSION_PERCENT,
            color_scheme: ColorScheme::default(),
            color_seed: 0,
            cluster_strategy: ClusterStrategy::default(),
        }
    }
}

impl GameConfig {
    /// Check that every field is usable.
    ///
    /// # Errors
    ///
    /// Returns the first invalid field found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.topology()?;

        if self.num_players == 0 {
            return Err(ConfigError::NoPlayers);
        }

        for (name, value) in [("claim_cost", self.claim_cost), ("swap_cost", self.swap_cost)] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidCost { name, value });
            }
        }

        if !(0.0..=100.0).contains(&self.commission_percent) {
            return Err(ConfigError::InvalidCommission(self.commission_percent));
        }

        Ok(())
    }

    /// The grid shape described by `grid_size`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidGridSize`] if the size is unsupported.
    pub fn topology(&self) -> Result<GridTopology, ConfigError> {
        GridTopology::new(self.grid_size).ok_or(ConfigError::InvalidGridSize(self.grid_size))
    }

    /// Costs and commission.
    #[must_use]
    pub const fn pricing(&self) -> Pricing {
        Pricing {
            claim_cost: self.claim_cost,
            swap_cost: self.swap_cost,
            commission_percent: self.commission_percent,
        }
    }

    /// Parse and validate a JSON config.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or a field is invalid.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is invalid.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }
}
