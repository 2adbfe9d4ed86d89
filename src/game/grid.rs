//! Grid topology: cell indexing and orthogonal adjacency.

use serde::{Deserialize, Serialize};

/// Index of a cell in row-major order (`row * size + col`).
pub type CellIndex = u16;

/// Default side length of the square grid.
pub const DEFAULT_GRID_SIZE: u16 = 20;

/// Largest supported side length. Keeps every index inside [`CellIndex`].
pub const MAX_GRID_SIZE: u16 = 255;

/// A row/column position on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coord {
    /// Row (0 = top).
    pub row: u16,
    /// Column (0 = left).
    pub col: u16,
}

impl Coord {
    /// Create a new coordinate.
    #[must_use]
    pub const fn new(row: u16, col: u16) -> Self {
        Self { row, col }
    }
}

/// Up to four orthogonal neighbors of a cell.
///
/// Stored inline so adjacency lookups never allocate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Neighbors {
    cells: [CellIndex; 4],
    len: u8,
}

impl Neighbors {
    /// The valid neighbors as a slice.
    #[must_use]
    #[inline]
    pub fn as_slice(&self) -> &[CellIndex] {
        &self.cells[..usize::from(self.len)]
    }

    /// Number of valid neighbors (2 for corners, 3 for edges, 4 inside).
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len as usize
    }

    /// Whether there are no neighbors (only on a 1×1 grid).
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterate over the neighbor indices.
    pub fn iter(&self) -> impl Iterator<Item = CellIndex> + '_ {
        self.as_slice().iter().copied()
    }

    /// Whether `cell` is one of the neighbors.
    #[must_use]
    pub fn contains(&self, cell: CellIndex) -> bool {
        self.as_slice().contains(&cell)
    }

    fn push(&mut self, cell: CellIndex) {
        self.cells[usize::from(self.len)] = cell;
        self.len += 1;
    }
}

/// Shape of a square grid. Pure, carries no ownership state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridTopology {
    size: u16,
}

impl Default for GridTopology {
    fn default() -> Self {
        Self {
            size: DEFAULT_GRID_SIZE,
        }
    }
}

impl GridTopology {
    /// Create a topology for a `size`×`size` grid.
    ///
    /// Returns `None` if `size` is zero or above [`MAX_GRID_SIZE`].
    #[must_use]
    pub const fn new(size: u16) -> Option<Self> {
        if size == 0 || size > MAX_GRID_SIZE {
            return None;
        }
        Some(Self { size })
    }

    /// Side length of the grid.
    #[must_use]
    pub const fn size(self) -> u16 {
        self.size
    }

    /// Total number of cells (`size²`).
    #[must_use]
    pub const fn cell_count(self) -> usize {
        self.size as usize * self.size as usize
    }

    /// Whether `index` addresses a cell of this grid.
    #[must_use]
    pub const fn contains(self, index: CellIndex) -> bool {
        (index as usize) < self.cell_count()
    }

    /// Row/column of a cell index.
    #[must_use]
    pub const fn coord(self, index: CellIndex) -> Coord {
        Coord::new(index / self.size, index % self.size)
    }

    /// Cell index of a coordinate, or `None` if it is off the grid.
    #[must_use]
    pub const fn index(self, coord: Coord) -> Option<CellIndex> {
        if coord.row < self.size && coord.col < self.size {
            Some(coord.row * self.size + coord.col)
        } else {
            None
        }
    }

    /// Orthogonal neighbors of `index` in the order left, right, up, down.
    ///
    /// Neighbors that would fall off the grid are omitted.
    #[must_use]
    #[inline]
    pub fn neighbors(self, index: CellIndex) -> Neighbors {
        let mut result = Neighbors {
            cells: [0; 4],
            len: 0,
        };
        let Coord { row, col } = self.coord(index);

        if col > 0 {
            result.push(index - 1); // left
        }
        if col + 1 < self.size {
            result.push(index + 1); // right
        }
        if row > 0 {
            result.push(index - self.size); // up
        }
        if row + 1 < self.size {
            result.push(index + self.size); // down
        }

        result
    }

    /// Iterate over every cell index in row-major order.
    pub fn cells(self) -> impl Iterator<Item = CellIndex> {
        // cell_count() <= 255², which always fits in a CellIndex
        #[allow(clippy::cast_possible_truncation)]
        let count = self.cell_count() as CellIndex;
        0..count
    }
}
