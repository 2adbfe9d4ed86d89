//! Player ledger and cluster state.

use serde::{Deserialize, Serialize};

use crate::game::{CellIndex, Cluster, player_weight};

/// Index of a player, `0..num_players`.
pub type PlayerId = u8;

/// Default number of players in a game.
pub const DEFAULT_NUM_PLAYERS: u8 = 10;

/// State for a single player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Player index.
    pub id: PlayerId,
    /// Cumulative tokens paid for actions.
    pub spent: f64,
    /// Cumulative tokens received from distributions.
    pub earned: f64,
    /// Always `earned - spent`.
    pub balance: f64,
    /// Sum of cluster weights.
    pub weight: f64,
    /// Clusters ordered by creation id.
    pub clusters: Vec<Cluster>,
}

impl Player {
    /// Create a player with an empty ledger and no territory.
    #[must_use]
    pub fn new(id: PlayerId) -> Self {
        Self {
            id,
            spent: 0.0,
            earned: 0.0,
            balance: 0.0,
            weight: 0.0,
            clusters: Vec::new(),
        }
    }

    /// Recompute `balance` from the ledger.
    pub fn refresh_balance(&mut self) {
        self.balance = self.earned - self.spent;
    }

    /// Recompute `weight` from the current clusters.
    pub fn refresh_weight(&mut self) {
        self.weight = player_weight(&self.clusters);
    }

    /// Number of cells the player owns.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.clusters.iter().map(Cluster::len).sum()
    }

    /// The cluster containing `cell`, if the player owns it.
    #[must_use]
    pub fn cluster_of(&self, cell: CellIndex) -> Option<&Cluster> {
        self.clusters.iter().find(|c| c.contains(cell))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Color;
    use std::collections::BTreeSet;

    fn cluster(id: u32, cells: &[CellIndex]) -> Cluster {
        Cluster {
            id,
            owner: 0,
            cells: cells.iter().copied().collect::<BTreeSet<_>>(),
            color: Color::new(0, 0, 0),
        }
    }

    #[test]
    fn test_player_creation() {
        let player = Player::new(3);
        assert_eq!(player.id, 3);
        assert!(player.clusters.is_empty());
        assert!(player.spent.abs() < f64::EPSILON);
        assert!(player.weight.abs() < f64::EPSILON);
    }

    #[test]
    fn test_refresh_balance() {
        let mut player = Player::new(0);
        player.spent = 10.0;
        player.earned = 4.5;
        player.refresh_balance();
        assert!((player.balance + 5.5).abs() < 1e-9);
    }

    #[test]
    fn test_refresh_weight_sums_clusters() {
        let mut player = Player::new(0);
        player.clusters = vec![cluster(0, &[0]), cluster(1, &[5, 6, 7])];
        player.refresh_weight();
        assert!((player.weight - (1.0 + 3.6)).abs() < 1e-9);
        assert_eq!(player.cell_count(), 4);
    }

    #[test]
    fn test_cluster_of() {
        let mut player = Player::new(0);
        player.clusters = vec![cluster(0, &[0]), cluster(4, &[5, 6])];
        assert_eq!(player.cluster_of(6).map(|c| c.id), Some(4));
        assert!(player.cluster_of(9).is_none());
    }
}
