//! Which cells may be claimed next.

use std::collections::BTreeSet;

use crate::game::{Board, CellIndex};

/// Compute the cells open for a new claim.
///
/// On an empty board every cell is available. Otherwise a cell is available
/// when it is unclaimed and at least one orthogonal neighbor is claimed.
#[must_use]
pub fn available_cells(board: &Board) -> BTreeSet<CellIndex> {
    let topology = board.topology();

    if board.is_empty() {
        return topology.cells().collect();
    }

    topology
        .cells()
        .filter(|&cell| {
            !board.is_claimed(cell)
                && topology.neighbors(cell).iter().any(|n| board.is_claimed(n))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::GridTopology;

    #[test]
    fn test_empty_board_everything_available() {
        let board = Board::new(GridTopology::new(20).unwrap());
        assert_eq!(available_cells(&board).len(), 400);
    }

    #[test]
    fn test_frontier_after_first_claim() {
        let mut board = Board::new(GridTopology::new(20).unwrap());
        board.set_owner(210, Some(0));
        let available = available_cells(&board);
        assert_eq!(available, BTreeSet::from([190, 209, 211, 230]));
    }

    #[test]
    fn test_frontier_is_shared_between_players() {
        let mut board = Board::new(GridTopology::new(5).unwrap());
        board.set_owner(0, Some(0));
        board.set_owner(4, Some(1));
        let available = available_cells(&board);
        assert_eq!(available, BTreeSet::from([1, 3, 5, 9]));
    }

    #[test]
    fn test_full_board_has_nothing_available() {
        let mut board = Board::new(GridTopology::new(2).unwrap());
        for cell in 0..4 {
            board.set_owner(cell, Some(0));
        }
        assert!(available_cells(&board).is_empty());
    }
}
