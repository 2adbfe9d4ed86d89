//! Error types for the game engine.

use std::path::PathBuf;

use crate::game::PlayerId;

/// Hard errors surfaced by [`GameState`](crate::game::GameState) operations.
///
/// Gameplay rule violations are not errors; they come back as
/// [`Outcome::Rejected`](crate::game::Outcome::Rejected).
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    /// A player index outside `0..num_players` was selected.
    #[error("invalid player {player}: game has {num_players} players")]
    InvalidPlayer {
        /// The requested player.
        player: PlayerId,
        /// Number of players in the game.
        num_players: u8,
    },

    /// The game configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Problems with a [`GameConfig`](crate::config::GameConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Grid side length outside `1..=255`.
    #[error("grid size {0} is out of range (1..=255)")]
    InvalidGridSize(u16),

    /// Player count of zero.
    #[error("a game needs at least one player")]
    NoPlayers,

    /// A cost that is negative, NaN or infinite.
    #[error("{name} must be a finite, non-negative amount (got {value})")]
    InvalidCost {
        /// Name of the offending field.
        name: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// Commission outside `0..=100` percent.
    #[error("commission must be between 0 and 100 percent (got {0})")]
    InvalidCommission(f64),

    /// The config file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        /// File that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The config text is not valid JSON for a config.
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Result alias for engine operations that can fail hard.
pub type GameResult<T> = Result<T, GameError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_player_message() {
        let err = GameError::InvalidPlayer {
            player: 12,
            num_players: 10,
        };
        assert_eq!(err.to_string(), "invalid player 12: game has 10 players");
    }

    #[test]
    fn test_config_error_is_transparent() {
        let err = GameError::from(ConfigError::InvalidGridSize(0));
        assert_eq!(err.to_string(), "grid size 0 is out of range (1..=255)");
    }
}
