//! Board vocabulary shared with the rules engine: sides, cells, coordinates and the grid
//!
//! The grid uses the "doubled row" layout of the match framework.
//! A hexagonal board of side 5 is stored in a 17x9 rectangle,
//! where each column holds every other row and the remaining cells are off the board.
//! The six neighbours of `(r, c)` are `(r ± 2, c)` and `(r ± 1, c ± 1)`.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rows of the standard board
pub const STANDARD_ROWS: usize = 17;
/// Columns of the standard board
pub const STANDARD_COLS: usize = 9;

/// Row/column offsets to the six neighbours of a cell
pub const DIRECTIONS: [(isize, isize); 6] = [(-2, 0), (2, 0), (-1, -1), (-1, 1), (1, -1), (1, 1)];

/// One of the two players
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    White,
    Black,
}

impl Side {
    /// The other player
    pub fn opponent(self) -> Self {
        match self {
            Side::White => Side::Black,
            Side::Black => Side::White,
        }
    }

    /// Single character tag, as used in grid pictures and fingerprints
    pub fn tag(self) -> char {
        match self {
            Side::White => 'W',
            Side::Black => 'B',
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// Contents of one grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Cell {
    /// Padding cell of the rectangular storage; never part of the board
    #[default]
    OffBoard,
    Empty,
    Piece(Side),
}

impl Cell {
    pub fn tag(self) -> char {
        match self {
            Cell::OffBoard => '-',
            Cell::Empty => '.',
            Cell::Piece(side) => side.tag(),
        }
    }

    pub fn from_tag(tag: char) -> Option<Self> {
        match tag {
            '-' => Some(Cell::OffBoard),
            '.' => Some(Cell::Empty),
            'W' => Some(Cell::Piece(Side::White)),
            'B' => Some(Cell::Piece(Side::Black)),
            _ => None,
        }
    }

    /// The owner of the piece in this cell, if any
    pub fn owner(self) -> Option<Side> {
        match self {
            Cell::Piece(side) => Some(side),
            _ => None,
        }
    }
}

/// A `(row, col)` grid coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    pub row: usize,
    pub col: usize,
}

impl Coord {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Manhattan distance on the raw grid indices
    pub fn manhattan(self, other: Coord) -> usize {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }

    /// Shifts `self` by the given offsets, if the result is non-negative
    pub fn offset(self, d_row: isize, d_col: isize) -> Option<Self> {
        Some(Self {
            row: self.row.checked_add_signed(d_row)?,
            col: self.col.checked_add_signed(d_col)?,
        })
    }
}

impl From<(usize, usize)> for Coord {
    fn from((row, col): (usize, usize)) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.row, self.col)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridError {
    #[error("grid picture is empty")]
    Empty,
    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        found: usize,
        expected: usize,
    },
    #[error("unknown cell tag {tag:?} in row {row}")]
    UnknownTag { row: usize, tag: char },
    #[error("expected {expected} cells for a {rows}x{cols} grid, got {found}")]
    CellCount {
        rows: usize,
        cols: usize,
        expected: usize,
        found: usize,
    },
}

/// Row-major occupancy grid of a position
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Builds a grid from row-major cells
    pub fn new(rows: usize, cols: usize, cells: Vec<Cell>) -> Result<Self, GridError> {
        if cells.len() != rows * cols {
            return Err(GridError::CellCount {
                rows,
                cols,
                expected: rows * cols,
                found: cells.len(),
            });
        }

        Ok(Self { rows, cols, cells })
    }

    /// The standard 61-cell hexagon with every board cell empty
    pub fn hexagon() -> Self {
        let mut cells = vec![Cell::OffBoard; STANDARD_ROWS * STANDARD_COLS];
        let half = STANDARD_COLS / 2;
        for col in 0..STANDARD_COLS {
            let indent = col.abs_diff(half);
            for row in (indent..STANDARD_ROWS - indent).step_by(2) {
                cells[row * STANDARD_COLS + col] = Cell::Empty;
            }
        }

        Self {
            rows: STANDARD_ROWS,
            cols: STANDARD_COLS,
            cells,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// The cell at `coord`, or [`None`] outside the rectangle
    pub fn get(&self, coord: Coord) -> Option<Cell> {
        if coord.row < self.rows && coord.col < self.cols {
            self.cells.get(coord.row * self.cols + coord.col).copied()
        } else {
            None
        }
    }

    /// Overwrites the cell at `coord`
    ///
    /// Returns the previous contents, or [`None`] (and does nothing) outside the rectangle
    pub fn set(&mut self, coord: Coord, cell: Cell) -> Option<Cell> {
        if coord.row < self.rows && coord.col < self.cols {
            let slot = self.cells.get_mut(coord.row * self.cols + coord.col)?;
            Some(std::mem::replace(slot, cell))
        } else {
            None
        }
    }

    /// Whether `coord` is a board cell with no piece on it
    pub fn is_empty_cell(&self, coord: Coord) -> bool {
        self.get(coord) == Some(Cell::Empty)
    }

    /// Rows of cells, top to bottom
    pub fn iter_rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.cols.max(1))
    }

    /// Every cell with its coordinate, in row-major order
    pub fn iter(&self) -> impl Iterator<Item = (Coord, Cell)> + '_ {
        let cols = self.cols.max(1);
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, cell)| (Coord::new(i / cols, i % cols), *cell))
    }

    /// The geometric centre cell
    pub fn center(&self) -> Coord {
        Coord::new(self.rows / 2, self.cols / 2)
    }

    /// Coordinates holding a piece of either side
    pub fn occupied_cells(&self) -> impl Iterator<Item = Coord> + '_ {
        self.iter()
            .filter(|(_, cell)| cell.owner().is_some())
            .map(|(coord, _)| coord)
    }

    /// Coordinates holding a piece of `side`
    pub fn pieces(&self, side: Side) -> impl Iterator<Item = Coord> + '_ {
        self.iter()
            .filter(move |(_, cell)| cell.owner() == Some(side))
            .map(|(coord, _)| coord)
    }

    /// On-board neighbours of `coord`
    pub fn neighbors(&self, coord: Coord) -> impl Iterator<Item = Coord> + '_ {
        DIRECTIONS.iter().filter_map(move |&(d_row, d_col)| {
            let next = coord.offset(d_row, d_col)?;
            match self.get(next)? {
                Cell::OffBoard => None,
                _ => Some(next),
            }
        })
    }

    /// The coordinate `coord` lands on when the board is turned half a turn
    pub fn rotate_coord(&self, coord: Coord) -> Coord {
        Coord::new(
            self.rows.saturating_sub(coord.row + 1),
            self.cols.saturating_sub(coord.col + 1),
        )
    }

    /// This grid turned half a turn, pieces keeping their owner
    pub fn rotated_half_turn(&self) -> Self {
        let mut cells = self.cells.clone();
        cells.reverse();

        Self {
            rows: self.rows,
            cols: self.cols,
            cells,
        }
    }

    /// Number of cells whose contents differ, or [`None`] if the shapes differ
    pub fn diff_count(&self, other: &Grid) -> Option<usize> {
        if self.rows != other.rows || self.cols != other.cols {
            return None;
        }

        Some(
            self.cells
                .iter()
                .zip(&other.cells)
                .filter(|(a, b)| a != b)
                .count(),
        )
    }
}

impl FromStr for Grid {
    type Err = GridError;

    /// Parses a picture with one line per row
    ///
    /// Blank lines and whitespace inside a line are ignored
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut cells = Vec::new();
        let mut rows = 0;
        let mut cols = None;

        for line in s.lines() {
            let tags: Vec<char> = line.chars().filter(|c| !c.is_whitespace()).collect();
            if tags.is_empty() {
                continue;
            }

            let expected = *cols.get_or_insert(tags.len());
            if tags.len() != expected {
                return Err(GridError::RaggedRow {
                    row: rows,
                    found: tags.len(),
                    expected,
                });
            }

            for tag in tags {
                cells.push(Cell::from_tag(tag).ok_or(GridError::UnknownTag { row: rows, tag })?);
            }
            rows += 1;
        }

        let cols = cols.ok_or(GridError::Empty)?;
        Self::new(rows, cols, cells)
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.iter_rows().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            for cell in row {
                write!(f, "{}", cell.tag())?;
            }
        }
        Ok(())
    }
}
