//! Fixed replies for the first plies of a match from a known starting layout

use std::sync::LazyLock;

use crate::board::{Cell, Coord, Grid, Side};

/// Plies covered by the book, three moves per side
pub const BOOK_PLIES: u32 = 6;

/// The centre cell, which Black's second and third book moves depend on
const CENTER: Coord = Coord::new(8, 4);

/// The starting layout a match was played from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// The standard 14-piece layout, White on the top three rows:
    ///
    /// ```text
    /// ----W----
    /// ---W-W---
    /// --W-W-.--
    /// -W-W-.-.-
    /// W-W-W-.-.
    /// -W-W-.-.-
    /// W-W-.-.-.
    /// -.-.-.-.-
    /// .-.-.-.-.
    /// -.-.-.-.-
    /// .-.-.-B-B
    /// -.-.-B-B-
    /// .-.-B-B-B
    /// -.-.-B-B-
    /// --.-B-B--
    /// ---B-B---
    /// ----B----
    /// ```
    Classic,
    /// [`Layout::Classic`] turned half a turn, White on the bottom three rows
    Rotated,
    /// Anything else; the book stays silent
    Other,
}

static CLASSIC: LazyLock<Grid> = LazyLock::new(classic_grid);
static ROTATED: LazyLock<Grid> = LazyLock::new(|| CLASSIC.rotated_half_turn());

/// Builds [`Layout::Classic`]: White fills the two display rows nearest its edge
/// (cells with `row + col` of 4 or 6) plus the middle three of the third,
/// and Black holds the half-turn image of that
fn classic_grid() -> Grid {
    let mut grid = Grid::hexagon();
    let board: Vec<Coord> = grid
        .iter()
        .filter(|(_, cell)| *cell == Cell::Empty)
        .map(|(coord, _)| coord)
        .collect();

    for coord in board {
        let line = coord.row + coord.col;
        let third_row = [Coord::new(6, 2), Coord::new(5, 3), Coord::new(4, 4)].contains(&coord);
        if line == 4 || line == 6 || third_row {
            let mirrored = grid.rotate_coord(coord);
            grid.set(coord, Cell::Piece(Side::White));
            grid.set(mirrored, Cell::Piece(Side::Black));
        }
    }

    grid
}

impl Layout {
    /// The starting grid of this layout, if it is a known one
    pub fn grid(self) -> Option<&'static Grid> {
        match self {
            Layout::Classic => Some(&*CLASSIC),
            Layout::Rotated => Some(&*ROTATED),
            Layout::Other => None,
        }
    }

    /// Recognises the starting layout from the first grid a player sees
    ///
    /// At ply 0 the grid must match exactly.
    /// At ply 1 (playing second) Black's pieces must be untouched,
    /// White must still have all its pieces, and White's single move may have changed at most six cells.
    /// Later plies are never recognised.
    pub fn detect(grid: &Grid, ply: u32) -> Self {
        [Layout::Classic, Layout::Rotated]
            .into_iter()
            .find(|layout| layout.matches(grid, ply))
            .unwrap_or(Layout::Other)
    }

    fn matches(self, grid: &Grid, ply: u32) -> bool {
        let Some(start) = self.grid() else {
            return false;
        };

        match ply {
            0 => start == grid,
            1 => {
                let black = Cell::Piece(Side::Black);
                let black_untouched = start
                    .iter()
                    .all(|(coord, cell)| (cell == black) == (grid.get(coord) == Some(black)));
                let white_intact =
                    start.pieces(Side::White).count() == grid.pieces(Side::White).count();
                let diff = start.diff_count(grid);

                black_untouched && white_intact && diff.is_some_and(|d| d <= 6)
            }
            _ => false,
        }
    }
}

/// Per-match state of the opening book
///
/// Black's second book move looks at whether White has already taken the centre,
/// and its third move depends on what was seen then, so that observation is kept here between turns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpeningBook {
    layout: Layout,
    center_was_free: Option<bool>,
}

impl OpeningBook {
    pub fn new(layout: Layout) -> Self {
        Self {
            layout,
            center_was_free: None,
        }
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// The book move for `side` at `ply`, as a `from -> to` pair
    ///
    /// Returns [`None`] past [`BOOK_PLIES`], for an unknown layout,
    /// or when `side` is not the side due at `ply`.
    pub fn lookup(&mut self, grid: &Grid, ply: u32, side: Side) -> Option<(Coord, Coord)> {
        if ply >= BOOK_PLIES || self.layout == Layout::Other {
            return None;
        }

        let due = if ply % 2 == 0 { Side::White } else { Side::Black };
        if side != due {
            return None;
        }

        // Book moves are written for the classic layout
        let ((from_row, from_col), (to_row, to_col)) = match ply {
            0 => ((1, 3), (3, 3)),
            1 => ((13, 7), (12, 6)),
            2 => ((5, 1), (6, 2)),
            3 => {
                let free = grid.is_empty_cell(self.place(grid, CENTER));
                self.center_was_free = Some(free);
                if free {
                    ((14, 4), (12, 4))
                } else {
                    ((15, 5), (13, 5))
                }
            }
            4 => ((3, 1), (4, 2)),
            _ => {
                // Joined the match after ply 3: look at the board as it is now
                let free = self
                    .center_was_free
                    .unwrap_or_else(|| grid.is_empty_cell(self.place(grid, CENTER)));
                if free {
                    ((15, 5), (13, 5))
                } else {
                    ((14, 6), (12, 6))
                }
            }
        };

        Some((
            self.place(grid, Coord::new(from_row, from_col)),
            self.place(grid, Coord::new(to_row, to_col)),
        ))
    }

    /// Maps a classic-layout coordinate onto this match's board
    fn place(&self, grid: &Grid, coord: Coord) -> Coord {
        match self.layout {
            Layout::Rotated => grid.rotate_coord(coord),
            _ => coord,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classic() -> Grid {
        Layout::Classic.grid().cloned().unwrap()
    }

    #[test]
    fn classic_layout_has_fourteen_pieces_each() {
        let grid = classic();
        assert_eq!(grid.pieces(Side::White).count(), 14);
        assert_eq!(grid.pieces(Side::Black).count(), 14);
        assert_eq!(grid.get(Coord::new(0, 4)), Some(Cell::Piece(Side::White)));
        assert_eq!(grid.get(Coord::new(16, 4)), Some(Cell::Piece(Side::Black)));
        assert!(grid.is_empty_cell(CENTER));
    }

    #[test]
    fn detects_known_layouts_at_ply_zero() {
        assert_eq!(Layout::detect(&classic(), 0), Layout::Classic);
        assert_eq!(Layout::detect(&classic().rotated_half_turn(), 0), Layout::Rotated);
        assert_eq!(Layout::detect(&Grid::hexagon(), 0), Layout::Other);
        assert_eq!(Layout::detect(&classic(), 2), Layout::Other);
    }

    #[test]
    fn detects_layout_after_whites_first_move() {
        let mut grid = classic();
        // White pushes the (1,3)-(3,3)-(5,3) line one step
        grid.set(Coord::new(1, 3), Cell::Empty);
        grid.set(Coord::new(7, 3), Cell::Piece(Side::White));
        assert_eq!(Layout::detect(&grid, 1), Layout::Classic);
        assert_eq!(Layout::detect(&grid, 0), Layout::Other);

        // Touching a Black piece rules the layout out
        grid.set(Coord::new(16, 4), Cell::Empty);
        assert_eq!(Layout::detect(&grid, 1), Layout::Other);
    }

    #[test]
    fn white_opens_from_the_top_edge() {
        let mut book = OpeningBook::new(Layout::Classic);
        assert_eq!(
            book.lookup(&classic(), 0, Side::White),
            Some((Coord::new(1, 3), Coord::new(3, 3)))
        );
        assert_eq!(book.lookup(&classic(), 0, Side::Black), None);
    }

    #[test]
    fn book_is_silent_past_the_window_or_for_other_layouts() {
        let mut book = OpeningBook::new(Layout::Classic);
        assert_eq!(book.lookup(&classic(), 6, Side::White), None);
        assert_eq!(book.lookup(&classic(), 7, Side::Black), None);

        let mut other = OpeningBook::new(Layout::Other);
        assert_eq!(other.lookup(&classic(), 0, Side::White), None);
    }

    #[test]
    fn blacks_third_move_follows_what_was_seen_at_ply_three() {
        let mut grid = classic();
        let mut book = OpeningBook::new(Layout::Classic);
        assert_eq!(
            book.lookup(&grid, 3, Side::Black),
            Some((Coord::new(14, 4), Coord::new(12, 4)))
        );

        // White takes the centre afterwards, but the ply 3 observation still decides ply 5
        grid.set(CENTER, Cell::Piece(Side::White));
        assert_eq!(
            book.lookup(&grid, 5, Side::Black),
            Some((Coord::new(15, 5), Coord::new(13, 5)))
        );

        let mut taken = OpeningBook::new(Layout::Classic);
        assert_eq!(
            taken.lookup(&grid, 3, Side::Black),
            Some((Coord::new(15, 5), Coord::new(13, 5)))
        );
        assert_eq!(
            taken.lookup(&grid, 5, Side::Black),
            Some((Coord::new(14, 6), Coord::new(12, 6)))
        );
    }

    #[test]
    fn rotated_book_mirrors_the_classic_moves() {
        let grid = classic().rotated_half_turn();
        let mut book = OpeningBook::new(Layout::Rotated);
        assert_eq!(
            book.lookup(&grid, 0, Side::White),
            Some((Coord::new(15, 5), Coord::new(13, 5)))
        );
        assert_eq!(
            book.lookup(&grid, 1, Side::Black),
            Some((Coord::new(3, 1), Coord::new(4, 2)))
        );
    }
}
