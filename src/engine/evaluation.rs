use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use super::transposition::{PositionCache, orient};
use crate::{
    board::{Grid, Side},
    game::Position,
    score::Score,
};

/// Anything that can put a number on a position
pub trait Evaluate<P: Position> {
    /// Scores `position` from `side`'s point of view: higher is better for `side`
    fn evaluate(&self, position: &P, side: Side) -> Score;
}

/// Weights of the terms in [`HeuristicEvaluator`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Weights {
    pub material: f64,
    pub center_control: f64,
    pub clustering: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            material: 1.0,
            center_control: 0.9,
            clustering: 0.4,
        }
    }
}

/// The match-long heuristic evaluator
///
/// Owns the [`PositionCache`] for the whole match.
/// The cache sits behind a lock so the evaluator can be shared across search threads;
/// concurrent stores of the same position write the same value.
#[derive(Debug)]
pub struct HeuristicEvaluator {
    weights: Weights,
    cache: Mutex<PositionCache>,
}

impl HeuristicEvaluator {
    pub fn new(weights: Weights, cache: PositionCache) -> Self {
        Self {
            weights,
            cache: Mutex::new(cache),
        }
    }

    pub fn weights(&self) -> Weights {
        self.weights
    }

    pub fn cache(&self) -> &Mutex<PositionCache> {
        &self.cache
    }

    /// Empties the cache, for the start of a new match
    pub fn clear_cache(&self) {
        self.cache.lock().clear();
    }
}

impl Default for HeuristicEvaluator {
    fn default() -> Self {
        Self::new(Weights::default(), PositionCache::default())
    }
}

impl<P: Position> Evaluate<P> for HeuristicEvaluator {
    fn evaluate(&self, position: &P, side: Side) -> Score {
        // The lock is released between lookup and record, so another thread may compute the same value
        if let Some(value) = self.cache.lock().lookup_for(position, side) {
            return Score::new(value);
        }

        // Always computed for White, so a cached value and a fresh one are bit-for-bit equal
        let white = eval_heuristic(position, Side::White, &self.weights);
        self.cache.lock().record(position, white);

        Score::new(orient(white, side))
    }
}

/// Weighted sum of the material, centre control and clustering terms, from `side`'s point of view
///
/// Every term is `f(side) - f(opponent)`.
pub fn eval_heuristic<P: Position>(position: &P, side: Side, weights: &Weights) -> f64 {
    let grid = position.grid();
    let opponent = side.opponent();

    let material = material(position, side) - material(position, opponent);
    let center = center_control(grid, side) - center_control(grid, opponent);
    let clusters = clustering(grid, side) - clustering(grid, opponent);

    weights.material * material + weights.center_control * center + weights.clustering * clusters
}

/// Opponent pieces `side` has pushed off so far
pub fn material<P: Position>(position: &P, side: Side) -> f64 {
    f64::from(position.score(side))
}

/// Negated mean Manhattan distance from `side`'s pieces to the centre cell
///
/// A side with no pieces scores 0.
pub fn center_control(grid: &Grid, side: Side) -> f64 {
    let center = grid.center();
    let (total, count) = grid
        .pieces(side)
        .fold((0usize, 0usize), |(total, count), coord| {
            (total + coord.manhattan(center), count + 1)
        });

    if count == 0 {
        return 0.0;
    }

    -(total as f64) / count as f64
}

/// Sum of the sizes of `side`'s connected groups of pieces
///
/// Groups are found by flood fill over same-owner neighbours, each piece counted once.
/// A lone piece is not a group and adds nothing.
pub fn clustering(grid: &Grid, side: Side) -> f64 {
    let mut seen = vec![false; grid.rows() * grid.cols()];
    let index = |row: usize, col: usize| row * grid.cols() + col;
    let mut stack = Vec::new();
    let mut total = 0usize;

    for start in grid.pieces(side) {
        if seen[index(start.row, start.col)] {
            continue;
        }
        seen[index(start.row, start.col)] = true;
        stack.push(start);

        let mut size = 0usize;
        while let Some(coord) = stack.pop() {
            size += 1;
            for next in grid.neighbors(coord) {
                let i = index(next.row, next.col);
                if !seen[i] && grid.get(next).and_then(|c| c.owner()) == Some(side) {
                    seen[i] = true;
                    stack.push(next);
                }
            }
        }

        if size > 1 {
            total += size;
        }
    }

    total as f64
}
