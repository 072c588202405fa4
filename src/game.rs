//! The boundary with the rules engine
//!
//! The engine owns board representation, move generation and legality.
//! Everything in [`crate::engine`] only reads positions through [`Position`].

use std::fmt::Debug;

use crate::board::{Coord, Grid, Side};

/// A game position, as supplied by the rules engine
///
/// Positions are values: [`Position::play`] produces a new position and never mutates `self`.
pub trait Position: Sized {
    /// An atomic action that turns one position into its successor
    type Move: Clone + Debug;

    /// The side about to act
    fn side_to_move(&self) -> Side;

    /// Number of plies played since the start of the match
    fn ply(&self) -> u32;

    /// Full occupancy grid
    fn grid(&self) -> &Grid;

    /// Opponent pieces pushed off the board by `side` so far
    fn score(&self, side: Side) -> u32;

    /// Legal moves for the side to move, in the engine's order
    ///
    /// Enumerated afresh on every call.
    fn legal_moves(&self) -> Vec<Self::Move>;

    fn is_terminal(&self) -> bool;

    /// The position reached by playing `mv`
    fn play(&self, mv: &Self::Move) -> Self;

    /// Converts a `from -> to` coordinate pair into a legal move, if there is one
    fn find_move(&self, from: Coord, to: Coord) -> Option<Self::Move>;

    /// Coordinates of every piece on the board
    fn occupied_cells(&self) -> Vec<Coord> {
        self.grid().occupied_cells().collect()
    }
}
