//! An Abalone-style game-playing agent
//!
//! The rules live outside this crate, behind the [`game::Position`] trait.
//! Given a position, an [`Agent`] answers with a move: from its opening book during the first plies,
//! otherwise from a depth-limited alpha-beta search over a cached heuristic evaluation.

pub mod board;
pub mod config;
pub mod engine;
pub mod game;
pub mod score;

#[cfg(test)]
mod testing;

pub use board::{Cell, Coord, Grid, Side};
pub use config::AgentConfig;
pub use engine::Agent;
pub use game::Position;
pub use score::Score;
