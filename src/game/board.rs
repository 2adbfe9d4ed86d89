//! Cell ownership storage.

use crate::game::{CellIndex, GridTopology, PlayerId};

/// Ownership of every cell on the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    /// Shape of the grid.
    topology: GridTopology,
    /// Owner per cell in row-major order (`None` = unclaimed).
    cells: Vec<Option<PlayerId>>,
    /// Number of claimed cells.
    claimed: usize,
}

impl Board {
    /// Create an empty board.
    #[must_use]
    pub fn new(topology: GridTopology) -> Self {
        Self {
            topology,
            cells: vec![None; topology.cell_count()],
            claimed: 0,
        }
    }

    /// The grid shape.
    #[must_use]
    pub const fn topology(&self) -> GridTopology {
        self.topology
    }

    /// Raw ownership slice in row-major order.
    #[must_use]
    #[inline]
    pub fn cells(&self) -> &[Option<PlayerId>] {
        &self.cells
    }

    /// Owner of a cell. Unclaimed and out-of-bounds cells both yield `None`.
    #[must_use]
    #[inline]
    pub fn owner(&self, cell: CellIndex) -> Option<PlayerId> {
        self.cells.get(usize::from(cell)).copied().flatten()
    }

    /// Whether the cell is claimed by anyone.
    #[must_use]
    pub fn is_claimed(&self, cell: CellIndex) -> bool {
        self.owner(cell).is_some()
    }

    /// Set the owner of a cell.
    ///
    /// Returns `false` if the cell is out of bounds.
    pub fn set_owner(&mut self, cell: CellIndex, owner: Option<PlayerId>) -> bool {
        let Some(slot) = self.cells.get_mut(usize::from(cell)) else {
            return false;
        };
        match (slot.is_some(), owner.is_some()) {
            (false, true) => self.claimed += 1,
            (true, false) => self.claimed -= 1,
            _ => {}
        }
        *slot = owner;
        true
    }

    /// Exchange the owners of two cells.
    ///
    /// Returns `false` (and changes nothing) if either cell is out of bounds.
    pub fn swap_owners(&mut self, a: CellIndex, b: CellIndex) -> bool {
        let (a, b) = (usize::from(a), usize::from(b));
        if a >= self.cells.len() || b >= self.cells.len() {
            return false;
        }
        self.cells.swap(a, b);
        true
    }

    /// Number of claimed cells.
    #[must_use]
    pub const fn claimed_count(&self) -> usize {
        self.claimed
    }

    /// Whether no cell has been claimed yet.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.claimed == 0
    }

    /// Whether every cell is claimed.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.claimed == self.cells.len()
    }

    /// Iterate over all cells with their owners.
    pub fn iter(&self) -> impl Iterator<Item = (CellIndex, Option<PlayerId>)> + '_ {
        self.topology.cells().zip(self.cells.iter().copied())
    }

    /// Iterate over every cell owned by `player`.
    pub fn cells_owned_by(&self, player: PlayerId) -> impl Iterator<Item = CellIndex> + '_ {
        self.iter()
            .filter(move |(_, owner)| *owner == Some(player))
            .map(|(cell, _)| cell)
    }

    /// Count cells owned by `player`.
    #[must_use]
    pub fn count_owned(&self, player: PlayerId) -> usize {
        self.cells.iter().filter(|owner| **owner == Some(player)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board() -> Board {
        Board::new(GridTopology::new(4).unwrap())
    }

    #[test]
    fn test_new_board_is_empty() {
        let b = board();
        assert!(b.is_empty());
        assert_eq!(b.cells().len(), 16);
        assert!(b.cells().iter().all(Option::is_none));
    }

    #[test]
    fn test_set_owner_tracks_claimed_count() {
        let mut b = board();
        assert!(b.set_owner(5, Some(1)));
        assert!(b.set_owner(6, Some(2)));
        assert_eq!(b.claimed_count(), 2);

        // Re-assigning an owned cell does not double count
        assert!(b.set_owner(5, Some(2)));
        assert_eq!(b.claimed_count(), 2);
        assert_eq!(b.owner(5), Some(2));
    }

    #[test]
    fn test_out_of_bounds() {
        let mut b = board();
        assert!(!b.set_owner(16, Some(0)));
        assert_eq!(b.owner(16), None);
        assert!(!b.swap_owners(0, 16));
    }

    #[test]
    fn test_swap_owners_keeps_claimed_count() {
        let mut b = board();
        b.set_owner(0, Some(1));
        b.set_owner(3, Some(2));
        assert!(b.swap_owners(0, 3));
        assert_eq!(b.owner(0), Some(2));
        assert_eq!(b.owner(3), Some(1));
        assert_eq!(b.claimed_count(), 2);
    }

    #[test]
    fn test_cells_owned_by() {
        let mut b = board();
        b.set_owner(1, Some(3));
        b.set_owner(9, Some(3));
        b.set_owner(4, Some(2));
        let owned: Vec<_> = b.cells_owned_by(3).collect();
        assert_eq!(owned, vec![1, 9]);
        assert_eq!(b.count_owned(3), 2);
        assert_eq!(b.count_owned(0), 0);
    }

    #[test]
    fn test_full_board() {
        let mut b = Board::new(GridTopology::new(2).unwrap());
        for cell in 0..4 {
            b.set_owner(cell, Some(0));
        }
        assert!(b.is_full());
    }
}
