//! Read-only views of the game and change notification.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::game::{CellIndex, GridTopology, Player, PlayerId};

/// Immutable copy of everything observable about a game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Grid shape.
    pub topology: GridTopology,
    /// Owner per cell in row-major order.
    pub cells: Vec<Option<PlayerId>>,
    /// Every player's ledger, weight and clusters.
    pub players: Vec<Player>,
    /// Accumulated commissions and bootstrap fees.
    pub treasury: f64,
    /// Cells open for a new claim, ascending.
    pub available: Vec<CellIndex>,
    /// The acting player.
    pub active_player: PlayerId,
    /// Pending swap source, if any.
    pub selected_cell: Option<CellIndex>,
}

impl Snapshot {
    /// Owner of a cell.
    #[must_use]
    pub fn owner(&self, cell: CellIndex) -> Option<PlayerId> {
        self.cells.get(usize::from(cell)).copied().flatten()
    }

    /// Number of claimed cells.
    #[must_use]
    pub fn claimed_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// Sum of all player weights.
    #[must_use]
    pub fn total_weight(&self) -> f64 {
        self.players.iter().map(|p| p.weight).sum()
    }
}

/// Callback invoked with a fresh snapshot after every applied operation.
pub type SnapshotListener = Box<dyn FnMut(&Snapshot) + Send>;

/// Handle returned by [`GameState::subscribe`](crate::game::GameState::subscribe).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Registered snapshot listeners, in subscription order.
#[derive(Default)]
pub(crate) struct Listeners {
    next_id: u64,
    entries: Vec<(SubscriptionId, SnapshotListener)>,
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &self.entries.len())
            .finish()
    }
}

impl Listeners {
    pub(crate) fn add(&mut self, listener: SnapshotListener) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, listener));
        id
    }

    pub(crate) fn remove(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry, _)| *entry != id);
        self.entries.len() != before
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn notify(&mut self, snapshot: &Snapshot) {
        for (_, listener) in &mut self.entries {
            listener(snapshot);
        }
    }
}
