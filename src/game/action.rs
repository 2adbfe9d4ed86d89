//! Player-facing actions and their outcomes.

use serde::{Deserialize, Serialize};

use crate::game::{CellIndex, PlayerId, Settlement};

/// A player-facing operation, as data.
///
/// Serialized with an `op` tag, e.g. `{"op":"claim","cell":210}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Action {
    /// Make `player` the active player.
    SelectPlayer {
        /// Player to activate.
        player: PlayerId,
    },
    /// Claim an available cell for the active player.
    Claim {
        /// Cell to claim.
        cell: CellIndex,
    },
    /// Select (or deselect) one of the active player's cells as a swap source.
    SelectCell {
        /// Cell to select.
        cell: CellIndex,
    },
    /// Swap the selected cell with `target`.
    Swap {
        /// Cell to take over.
        target: CellIndex,
    },
    /// Route a click on `cell` to claim, select or swap.
    Click {
        /// Clicked cell.
        cell: CellIndex,
    },
}

/// Why an operation left the game unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Rejection {
    /// The cell index is off the grid.
    #[error("rejected: cell {cell} is off the grid")]
    CellOutOfBounds {
        /// Offending cell.
        cell: CellIndex,
    },
    /// The cell to claim already has an owner.
    #[error("rejected: cell {cell} is already owned by player {owner}")]
    CellOccupied {
        /// Offending cell.
        cell: CellIndex,
        /// Current owner.
        owner: PlayerId,
    },
    /// The cell is not adjacent to any claimed cell.
    #[error("rejected: cell {cell} is not available for claiming")]
    CellUnavailable {
        /// Offending cell.
        cell: CellIndex,
    },
    /// The cell to select is not owned by the active player.
    #[error("rejected: cell {cell} is not owned by the active player")]
    NotOwnedByActivePlayer {
        /// Offending cell.
        cell: CellIndex,
    },
    /// A swap was requested with no source cell selected.
    #[error("rejected: no cell selected to swap from")]
    NoSelection,
    /// The swap target is the selected cell itself.
    #[error("rejected: cannot swap cell {cell} with itself")]
    SameCell {
        /// Offending cell.
        cell: CellIndex,
    },
    /// The swap target has no owner.
    #[error("rejected: swap target {cell} is unclaimed")]
    TargetUnclaimed {
        /// Offending cell.
        cell: CellIndex,
    },
    /// A click landed on another player's cell with nothing selected.
    #[error("rejected: cell {cell} belongs to player {owner}")]
    ClaimedByOtherPlayer {
        /// Offending cell.
        cell: CellIndex,
        /// Current owner.
        owner: PlayerId,
    },
}

/// Result of an operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
#[must_use]
pub enum Outcome {
    /// The active player changed.
    PlayerSelected {
        /// New active player.
        player: PlayerId,
    },
    /// A cell was claimed.
    Claimed {
        /// Claimed cell.
        cell: CellIndex,
        /// Fee settlement.
        settlement: Settlement,
    },
    /// A cell became the swap source.
    CellSelected {
        /// Selected cell.
        cell: CellIndex,
    },
    /// The pending selection was cleared.
    SelectionCleared {
        /// Previously selected cell.
        cell: CellIndex,
    },
    /// Two cells exchanged owners.
    Swapped {
        /// Cell the active player gave up.
        source: CellIndex,
        /// Cell the active player took.
        target: CellIndex,
        /// Previous owner of `target`.
        displaced: PlayerId,
        /// Fee settlement.
        settlement: Settlement,
    },
    /// Nothing changed.
    Rejected {
        /// Why.
        rejection: Rejection,
    },
}

impl Outcome {
    /// Whether the operation changed the game.
    #[must_use]
    pub const fn is_applied(&self) -> bool {
        !matches!(self, Outcome::Rejected { .. })
    }

    /// The rejection reason, if any.
    #[must_use]
    pub const fn rejection(&self) -> Option<Rejection> {
        match self {
            Outcome::Rejected { rejection } => Some(*rejection),
            _ => None,
        }
    }

    /// The fee settlement of a costed action.
    #[must_use]
    pub const fn settlement(&self) -> Option<&Settlement> {
        match self {
            Outcome::Claimed { settlement, .. } | Outcome::Swapped { settlement, .. } => {
                Some(settlement)
            }
            _ => None,
        }
    }
}

impl From<Rejection> for Outcome {
    fn from(rejection: Rejection) -> Self {
        Outcome::Rejected { rejection }
    }
}
