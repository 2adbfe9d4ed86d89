// Allow unwrap and unreadable literals in tests (test code is not production)
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::unreadable_literal))]
//! Claimgrid: a deterministic territory-claiming game engine.
//!
//! Players claim cells on a square grid. Orthogonally connected cells of one
//! owner form clusters, and cluster sizes decide each player's weight. Every
//! claim or swap costs tokens: a commission goes to the treasury and the rest
//! is shared among all players in proportion to their weight.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │   CLI (play / run / simulate)       │
//! ├─────────────────────────────────────┤
//! │   Game state machine + snapshots    │
//! ├─────────────────────────────────────┤
//! │   Clusters · Weights · Economy      │
//! ├─────────────────────────────────────┤
//! │   Grid topology · Board             │
//! └─────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use claimgrid::{GameConfig, GameState};
//!
//! let mut game = GameState::new(GameConfig::default())?;
//! assert!(game.claim(210).is_applied());
//! assert_eq!(game.available_cells().len(), 4);
//! # Ok::<(), claimgrid::GameError>(())
//! ```

pub mod config;
pub mod error;
pub mod game;
pub mod render;
pub mod simulation;

pub use config::GameConfig;
pub use error::{ConfigError, GameError, GameResult};

// Re-export key game types at crate root for convenience
pub use game::{
    Action, CellIndex, Cluster, ClusterStrategy, GameState, Outcome, Player, PlayerId, Rejection,
    Snapshot,
};
