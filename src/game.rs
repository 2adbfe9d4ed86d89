//! Game layer for Claimgrid.
//!
//! Implements the territory game on a square grid:
//! - Grid topology and cell ownership
//! - Clusters of connected cells and their weights
//! - Token economy (fees, commission, weighted distribution)
//! - Claim availability
//! - The state machine that ties them together

mod action;
mod availability;
mod board;
mod cluster;
mod color;
mod economy;
mod grid;
mod invariants;
mod player;
mod snapshot;
mod state;
mod weight;

pub use action::{Action, Outcome, Rejection};
pub use availability::available_cells;
pub use board::Board;
pub use cluster::{
    Cluster, ClusterFactory, ClusterId, ClusterStrategy, absorb_claim, connected_components,
    is_connected, rebuild_clusters,
};
pub use color::{Color, ColorPicker, ColorScheme, player_hue};
pub use economy::{
    ActionKind, DEFAULT_CLAIM_COST, DEFAULT_COMMISSION_PERCENT, DEFAULT_SWAP_COST, FeeSplit,
    Pricing, Settlement, distribute, is_bootstrap, refresh_balances, settle, split_fee,
};
pub use grid::{CellIndex, Coord, DEFAULT_GRID_SIZE, GridTopology, MAX_GRID_SIZE, Neighbors};
pub use invariants::{InvariantViolation, LEDGER_TOLERANCE, assert_invariants, check_invariants};
pub use player::{DEFAULT_NUM_PLAYERS, Player, PlayerId};
pub use snapshot::{Snapshot, SnapshotListener, SubscriptionId};
pub use state::GameState;
pub use weight::{cluster_weight, player_weight};
