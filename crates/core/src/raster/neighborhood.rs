//! D8 directions and 8-neighbour iteration

use serde::{Deserialize, Serialize};

/// One of the eight D8 flow directions.
///
/// Variants are ordered clockwise from north-east, matching the bit order
/// of the power-of-two code table (`NE = 1`, `E = 2`, ... `N = 128`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
    North,
}

impl Direction {
    /// All directions in index order
    pub const ALL: [Direction; 8] = [
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
        Direction::North,
    ];

    /// (row_offset, col_offset) of the neighbour this direction points at
    pub fn offset(self) -> (isize, isize) {
        match self {
            Direction::NorthEast => (-1, 1),
            Direction::East => (0, 1),
            Direction::SouthEast => (1, 1),
            Direction::South => (1, 0),
            Direction::SouthWest => (1, -1),
            Direction::West => (0, -1),
            Direction::NorthWest => (-1, -1),
            Direction::North => (-1, 0),
        }
    }

    pub fn is_diagonal(self) -> bool {
        let (dr, dc) = self.offset();
        dr != 0 && dc != 0
    }

    /// True for E and W steps
    pub fn is_east_west(self) -> bool {
        self.offset().0 == 0
    }

    /// 1-based index used as the stored cell value (0 means no direction)
    pub fn index(self) -> u8 {
        self as u8 + 1
    }

    pub fn from_index(index: u8) -> Option<Direction> {
        match index {
            1..=8 => Some(Self::ALL[index as usize - 1]),
            _ => None,
        }
    }

    /// Neighbour of `(row, col)` in this direction, if it lies on a `rows x cols` grid
    pub fn step(self, row: usize, col: usize, rows: usize, cols: usize) -> Option<(usize, usize)> {
        let (dr, dc) = self.offset();
        let nr = row.checked_add_signed(dr)?;
        let nc = col.checked_add_signed(dc)?;
        (nr < rows && nc < cols).then_some((nr, nc))
    }
}

/// In-grid 8-neighbours of a cell.
///
/// Yields `(direction, row, col)` where `direction` points from the centre
/// to the neighbour. Neighbours off the grid are skipped.
pub struct D8Neighbors {
    center: (usize, usize),
    shape: (usize, usize),
    index: usize,
}

impl D8Neighbors {
    pub fn new(row: usize, col: usize, rows: usize, cols: usize) -> Self {
        Self {
            center: (row, col),
            shape: (rows, cols),
            index: 0,
        }
    }
}

impl Iterator for D8Neighbors {
    type Item = (Direction, usize, usize);

    fn next(&mut self) -> Option<Self::Item> {
        while self.index < Direction::ALL.len() {
            let dir = Direction::ALL[self.index];
            self.index += 1;
            let (row, col) = self.center;
            if let Some((nr, nc)) = dir.step(row, col, self.shape.0, self.shape.1) {
                return Some((dir, nr, nc));
            }
        }
        None
    }
}
