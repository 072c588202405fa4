//! A small rules engine for driving the agent through whole turns
//!
//! Moves are inline steps: a line of one to three of the mover's pieces advances one cell
//! along its own axis into an empty cell. There are no pushes, so scores never change;
//! the game ends after a fixed number of plies.

#![allow(dead_code)]

use sumito::{
    Cell, Coord, Grid, Position, Side,
    board::DIRECTIONS,
    engine::opening::Layout,
};

/// Longest line that may move together
const MAX_LINE: usize = 3;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// The tail piece of a line and the direction it moves in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub from: Coord,
    pub direction: (isize, isize),
}

impl Step {
    /// The cell the tail piece moves onto
    pub fn to(&self) -> Option<Coord> {
        self.from.offset(self.direction.0, self.direction.1)
    }
}

#[derive(Debug, Clone)]
pub struct ToyGame {
    grid: Grid,
    side: Side,
    ply: u32,
    last_ply: u32,
}

impl ToyGame {
    pub fn new(grid: Grid, side: Side, ply: u32) -> Self {
        Self {
            grid,
            side,
            ply,
            last_ply: 40,
        }
    }

    pub fn classic() -> Self {
        let grid = Layout::Classic
            .grid()
            .cloned()
            .expect("classic layout has a grid");
        Self::new(grid, Side::White, 0)
    }

    pub fn rotated() -> Self {
        let grid = Layout::Rotated
            .grid()
            .cloned()
            .expect("rotated layout has a grid");
        Self::new(grid, Side::White, 0)
    }

    /// Ends the game once `last_ply` plies have been played
    pub fn ending_at(mut self, last_ply: u32) -> Self {
        self.last_ply = last_ply;
        self
    }

    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    /// The empty cell in front of the line starting at `from`, if the line is short enough to move
    fn landing(&self, from: Coord, direction: (isize, isize)) -> Option<Coord> {
        let own = Cell::Piece(self.side);
        let mut cell = from;
        for _ in 0..MAX_LINE {
            if self.grid.get(cell)? != own {
                return None;
            }
            cell = cell.offset(direction.0, direction.1)?;
            if self.grid.is_empty_cell(cell) {
                return Some(cell);
            }
        }
        None
    }

    fn is_legal(&self, step: &Step) -> bool {
        self.landing(step.from, step.direction).is_some()
    }
}

impl Position for ToyGame {
    type Move = Step;

    fn side_to_move(&self) -> Side {
        self.side
    }

    fn ply(&self) -> u32 {
        self.ply
    }

    fn grid(&self) -> &Grid {
        &self.grid
    }

    fn score(&self, _side: Side) -> u32 {
        0
    }

    fn legal_moves(&self) -> Vec<Step> {
        self.grid
            .pieces(self.side)
            .flat_map(|from| {
                DIRECTIONS
                    .into_iter()
                    .map(move |direction| Step { from, direction })
            })
            .filter(|step| self.is_legal(step))
            .collect()
    }

    fn is_terminal(&self) -> bool {
        self.ply >= self.last_ply
    }

    fn play(&self, mv: &Step) -> Self {
        let mut next = self.clone();
        if let Some(landing) = self.landing(mv.from, mv.direction) {
            next.grid.set(mv.from, Cell::Empty);
            next.grid.set(landing, Cell::Piece(self.side));
        }
        next.side = self.side.opponent();
        next.ply += 1;
        next
    }

    fn find_move(&self, from: Coord, to: Coord) -> Option<Step> {
        let direction = (
            to.row as isize - from.row as isize,
            to.col as isize - from.col as isize,
        );
        let step = Step { from, direction };
        (DIRECTIONS.contains(&direction) && self.is_legal(&step)).then_some(step)
    }
}
