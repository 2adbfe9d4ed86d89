//! Cluster engine: maximal connected groups of same-owner cells.
//!
//! Two strategies maintain a player's clusters:
//! - [`absorb_claim`] folds a newly claimed cell into the existing clusters,
//!   merging every cluster the cell touches.
//! - [`rebuild_clusters`] discards the player's clusters and recomputes them
//!   with a breadth-first search. This is the only correct option after a
//!   player loses a cell, since removal can split a cluster.
//!
//! Cluster ids record creation order. When clusters merge, the one with the
//! lowest id survives and keeps its color.

use std::collections::{BTreeSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::game::{Board, CellIndex, Color, ColorPicker, GridTopology, PlayerId, cluster_weight};

/// Creation-order identifier of a cluster, unique within a game.
pub type ClusterId = u32;

/// A maximal set of orthogonally connected cells owned by one player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cluster {
    /// Creation-order id.
    pub id: ClusterId,
    /// Owning player.
    pub owner: PlayerId,
    /// Member cells (never empty).
    pub cells: BTreeSet<CellIndex>,
    /// Display color.
    pub color: Color,
}

impl Cluster {
    /// Number of cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the cluster has no cells. Never true for a cluster held by a player.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Whether `cell` belongs to this cluster.
    #[must_use]
    pub fn contains(&self, cell: CellIndex) -> bool {
        self.cells.contains(&cell)
    }

    /// Weight contribution of this cluster.
    #[must_use]
    pub fn weight(&self) -> f64 {
        cluster_weight(self.len())
    }
}

/// Which strategy updates the claimant's clusters after a claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClusterStrategy {
    /// Merge the new cell into touching clusters.
    Incremental,
    /// Recompute all of the claimant's clusters from the board.
    #[default]
    FullRecompute,
}

/// Hands out cluster ids and colors.
#[derive(Debug, Clone)]
pub struct ClusterFactory {
    next_id: ClusterId,
    colors: ColorPicker,
}

impl ClusterFactory {
    /// Create a factory drawing colors from `colors`.
    #[must_use]
    pub fn new(colors: ColorPicker) -> Self {
        Self { next_id: 0, colors }
    }

    /// Id the next created cluster will receive.
    #[must_use]
    pub const fn next_id(&self) -> ClusterId {
        self.next_id
    }

    /// Create a cluster with a fresh id and color.
    pub fn create(&mut self, owner: PlayerId, cells: BTreeSet<CellIndex>) -> Cluster {
        let id = self.next_id;
        self.next_id += 1;
        Cluster {
            id,
            owner,
            cells,
            color: self.colors.next(owner),
        }
    }
}

/// Connected components of the cells owned by `player`.
///
/// Components come out ordered by their smallest cell.
#[must_use]
pub fn connected_components(board: &Board, player: PlayerId) -> Vec<BTreeSet<CellIndex>> {
    let topology = board.topology();
    let mut visited = vec![false; topology.cell_count()];
    let mut components = Vec::new();
    let mut queue = VecDeque::new();

    for start in board.cells_owned_by(player) {
        if visited[usize::from(start)] {
            continue;
        }

        let mut component = BTreeSet::new();
        visited[usize::from(start)] = true;
        queue.push_back(start);

        while let Some(cell) = queue.pop_front() {
            component.insert(cell);
            for next in topology.neighbors(cell).iter() {
                if !visited[usize::from(next)] && board.owner(next) == Some(player) {
                    visited[usize::from(next)] = true;
                    queue.push_back(next);
                }
            }
        }

        components.push(component);
    }

    components
}

/// Whether `cells` form one orthogonally connected group.
///
/// The empty set is not connected.
#[must_use]
pub fn is_connected(cells: &BTreeSet<CellIndex>, topology: GridTopology) -> bool {
    let Some(&start) = cells.first() else {
        return false;
    };

    let mut seen = BTreeSet::from([start]);
    let mut queue = VecDeque::from([start]);
    while let Some(cell) = queue.pop_front() {
        for next in topology.neighbors(cell).iter() {
            if cells.contains(&next) && seen.insert(next) {
                queue.push_back(next);
            }
        }
    }

    seen.len() == cells.len()
}

/// Recompute `player`'s clusters from the board.
///
/// Components are visited by smallest cell. Each inherits the id and color
/// of the lowest-id previous cluster it overlaps that no earlier component
/// has inherited; the rest get fresh ones from `factory`. The result is
/// ordered by id.
pub fn rebuild_clusters(
    previous: &[Cluster],
    board: &Board,
    player: PlayerId,
    factory: &mut ClusterFactory,
) -> Vec<Cluster> {
    let mut inherited = vec![false; previous.len()];
    let mut rebuilt = Vec::new();

    for cells in connected_components(board, player) {
        let heir = previous
            .iter()
            .enumerate()
            .filter(|(i, old)| !inherited[*i] && !old.cells.is_disjoint(&cells))
            .min_by_key(|(_, old)| old.id)
            .map(|(i, _)| i);

        let cluster = match heir {
            Some(i) => {
                inherited[i] = true;
                Cluster {
                    id: previous[i].id,
                    owner: player,
                    cells,
                    color: previous[i].color,
                }
            }
            None => factory.create(player, cells),
        };
        rebuilt.push(cluster);
    }

    rebuilt.sort_by_key(|c| c.id);
    tracing::trace!(player, clusters = rebuilt.len(), "clusters rebuilt");
    rebuilt
}

/// Fold a cell just claimed by `player` into their clusters.
///
/// `clusters` must hold the player's clusters ordered by id, as produced by
/// this module; the order is preserved.
pub fn absorb_claim(
    clusters: &mut Vec<Cluster>,
    board: &Board,
    player: PlayerId,
    cell: CellIndex,
    factory: &mut ClusterFactory,
) {
    let neighbors = board.topology().neighbors(cell);
    let touching: Vec<ClusterId> = clusters
        .iter()
        .filter(|c| neighbors.iter().any(|n| c.contains(n)))
        .map(|c| c.id)
        .collect();

    let Some(&keeper) = touching.iter().min() else {
        clusters.push(factory.create(player, BTreeSet::from([cell])));
        return;
    };

    let mut merged = BTreeSet::from([cell]);
    clusters.retain_mut(|c| {
        if c.id != keeper && touching.contains(&c.id) {
            merged.append(&mut c.cells);
            false
        } else {
            true
        }
    });
    if let Some(target) = clusters.iter_mut().find(|c| c.id == keeper) {
        target.cells.append(&mut merged);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::ColorScheme;

    fn factory() -> ClusterFactory {
        ClusterFactory::new(ColorPicker::new(ColorScheme::Random, 1, 4))
    }

    fn board_with(size: u16, owned: &[(CellIndex, PlayerId)]) -> Board {
        let mut board = Board::new(GridTopology::new(size).unwrap());
        for &(cell, player) in owned {
            board.set_owner(cell, Some(player));
        }
        board
    }

    fn cell_sets(clusters: &[Cluster]) -> Vec<Vec<CellIndex>> {
        clusters.iter().map(|c| c.cells.iter().copied().collect()).collect()
    }

    #[test]
    fn test_components_split_by_gap() {
        // Row 0 of a 5×5 grid: P0 owns 0,1 and 3,4 with 2 empty
        let board = board_with(5, &[(0, 0), (1, 0), (3, 0), (4, 0)]);
        let components = connected_components(&board, 0);
        assert_eq!(components.len(), 2);
        assert_eq!(components[0], BTreeSet::from([0, 1]));
        assert_eq!(components[1], BTreeSet::from([3, 4]));
    }

    #[test]
    fn test_components_ignore_other_players() {
        let board = board_with(5, &[(0, 0), (1, 1), (2, 0)]);
        assert_eq!(connected_components(&board, 0).len(), 2);
        assert_eq!(connected_components(&board, 1).len(), 1);
        assert!(connected_components(&board, 2).is_empty());
    }

    #[test]
    fn test_diagonal_is_not_connected() {
        // 0 and 6 touch only at a corner on a 5×5 grid
        let topology = GridTopology::new(5).unwrap();
        assert!(!is_connected(&BTreeSet::from([0, 6]), topology));
        assert!(is_connected(&BTreeSet::from([0, 1, 6]), topology));
        assert!(!is_connected(&BTreeSet::new(), topology));
    }

    #[test]
    fn test_absorb_creates_singleton() {
        let mut f = factory();
        let board = board_with(5, &[(12, 0)]);
        let mut clusters = Vec::new();
        absorb_claim(&mut clusters, &board, 0, 12, &mut f);
        assert_eq!(cell_sets(&clusters), vec![vec![12]]);
        assert_eq!(clusters[0].id, 0);
    }

    #[test]
    fn test_absorb_merges_into_lowest_id() {
        let mut f = factory();
        let mut board = board_with(5, &[(0, 0)]);
        let mut clusters = Vec::new();
        absorb_claim(&mut clusters, &board, 0, 0, &mut f);
        board.set_owner(2, Some(0));
        absorb_claim(&mut clusters, &board, 0, 2, &mut f);
        assert_eq!(clusters.len(), 2);
        let keeper_color = clusters[0].color;

        // Cell 1 bridges both clusters
        board.set_owner(1, Some(0));
        absorb_claim(&mut clusters, &board, 0, 1, &mut f);
        assert_eq!(cell_sets(&clusters), vec![vec![0, 1, 2]]);
        assert_eq!(clusters[0].id, 0);
        assert_eq!(clusters[0].color, keeper_color);
    }

    #[test]
    fn test_rebuild_splits_and_keeps_first_heir() {
        let mut f = factory();
        let mut board = board_with(5, &[(0, 0), (1, 0), (2, 0)]);
        let previous = rebuild_clusters(&[], &board, 0, &mut f);
        assert_eq!(previous.len(), 1);

        // Remove the middle cell
        board.set_owner(1, Some(1));
        let rebuilt = rebuild_clusters(&previous, &board, 0, &mut f);
        assert_eq!(cell_sets(&rebuilt), vec![vec![0], vec![2]]);
        assert_eq!(rebuilt[0].id, previous[0].id);
        assert_eq!(rebuilt[0].color, previous[0].color);
        assert_eq!(rebuilt[1].id, 1);
    }

    #[test]
    fn test_rebuild_matches_absorb_on_claims() {
        let mut fa = factory();
        let mut fb = factory();
        let mut board = Board::new(GridTopology::new(5).unwrap());
        let mut incremental = Vec::new();
        let mut full = Vec::new();

        for cell in [6, 8, 18, 7, 13, 0] {
            board.set_owner(cell, Some(2));
            absorb_claim(&mut incremental, &board, 2, cell, &mut fa);
            full = rebuild_clusters(&full, &board, 2, &mut fb);
            assert_eq!(incremental, full, "diverged after claiming {cell}");
        }
    }

    #[test]
    fn test_rebuild_drops_vanished_clusters() {
        let mut f = factory();
        let mut board = board_with(5, &[(0, 3), (24, 3)]);
        let previous = rebuild_clusters(&[], &board, 3, &mut f);
        assert_eq!(previous.len(), 2);

        board.set_owner(24, Some(1));
        let rebuilt = rebuild_clusters(&previous, &board, 3, &mut f);
        assert_eq!(rebuilt.len(), 1);
        assert_eq!(rebuilt[0].id, previous[0].id);
    }
}
