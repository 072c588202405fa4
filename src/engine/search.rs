//! Depth-limited minimax search with alpha-beta pruning

use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::Instant,
};

use rayon::iter::{IntoParallelIterator, ParallelIterator};
use thiserror::Error;

use super::evaluation::Evaluate;
use crate::{board::Side, game::Position, score::Score};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SearchError {
    /// The rules engine offered no move in a position it did not call terminal
    #[error("position at ply {ply} is not terminal but has no legal moves")]
    NoLegalMoves { ply: u32 },
}

/// Counters for one search
#[derive(Debug, Default)]
pub struct SearchStats {
    nodes: AtomicU64,
    evaluations: AtomicU64,
    cutoffs: AtomicU64,
}

impl SearchStats {
    /// Positions visited, leaves included
    pub fn nodes(&self) -> u64 {
        self.nodes.load(Ordering::Relaxed)
    }

    /// Calls made to the evaluator
    pub fn evaluations(&self) -> u64 {
        self.evaluations.load(Ordering::Relaxed)
    }

    /// Move lists abandoned early by a cutoff
    pub fn cutoffs(&self) -> u64 {
        self.cutoffs.load(Ordering::Relaxed)
    }
}

/// A single search, from the point of view of the side it maximizes for
///
/// Every node is scored for that side: maximizing nodes pick the highest child, minimizing nodes the lowest.
#[derive(Debug)]
pub struct Search<'e, E> {
    evaluator: &'e E,
    perspective: Side,
    stop_time: Option<Instant>,
    stats: SearchStats,
}

impl<'e, E> Search<'e, E> {
    /// Sets up a search maximizing for `perspective`
    pub fn new(evaluator: &'e E, perspective: Side) -> Self {
        Self {
            evaluator,
            perspective,
            stop_time: None,
            stats: SearchStats::default(),
        }
    }

    /// Stops expanding nodes once `stop_time` has passed
    pub fn with_stop_time(mut self, stop_time: Option<Instant>) -> Self {
        self.stop_time = stop_time;
        self
    }

    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    fn out_of_time(&self) -> bool {
        self.stop_time
            .map(|st| Instant::now() >= st)
            .unwrap_or_default()
    }

    /// Searches `depth` plies below `position`, which must be the perspective side's turn
    pub fn search_root<P>(
        &self,
        position: &P,
        depth: u8,
    ) -> Result<BoardEvaluation<P::Move>, SearchError>
    where
        P: Position,
        E: Evaluate<P>,
    {
        self.alpha_beta(position, Score::min(), Score::max(), depth, true)
    }

    /// Like [`Self::search_root`], but searches the root's children in parallel
    ///
    /// Each child gets a full window, so the values are exact;
    /// ties go to the earliest move, which makes the result identical to the sequential search.
    pub fn search_root_parallel<P>(
        &self,
        position: &P,
        depth: u8,
    ) -> Result<BoardEvaluation<P::Move>, SearchError>
    where
        P: Position + Sync,
        P::Move: Send,
        E: Evaluate<P> + Sync,
    {
        if depth == 0 || position.is_terminal() || self.out_of_time() {
            return self.search_root(position, depth);
        }

        self.stats.nodes.fetch_add(1, Ordering::Relaxed);
        let moves = position.legal_moves();
        if moves.is_empty() {
            return Err(SearchError::NoLegalMoves {
                ply: position.ply(),
            });
        }

        let children = moves
            .into_par_iter()
            .map(|mv| {
                let next = position.play(&mv);
                self.alpha_beta(&next, Score::min(), Score::max(), depth - 1, false)
                    .map(|child| BoardEvaluation::from_child(child, mv))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut best = BoardEvaluation::identity(true);
        for eval in children {
            best.consider(eval, true);
        }

        Ok(best)
    }

    /// Scores `position` for the perspective side, `depth` plies deep
    ///
    /// `maximizing` says whose turn it is at this node; it flips on every ply.
    /// Returns the score and, unless this node is a leaf, the move that achieves it.
    /// Moves are tried in the order the rules engine lists them.
    pub fn alpha_beta<P>(
        &self,
        position: &P,
        mut alpha: Score,
        mut beta: Score,
        depth: u8,
        maximizing: bool,
    ) -> Result<BoardEvaluation<P::Move>, SearchError>
    where
        P: Position,
        E: Evaluate<P>,
    {
        self.stats.nodes.fetch_add(1, Ordering::Relaxed);

        if depth == 0 || position.is_terminal() {
            return Ok(BoardEvaluation::score(self.leaf(position)));
        }

        if self.out_of_time() {
            // Early termination on time
            return Ok(BoardEvaluation::score_early(self.leaf(position)));
        }

        let moves = position.legal_moves();
        if moves.is_empty() {
            return Err(SearchError::NoLegalMoves {
                ply: position.ply(),
            });
        }

        let mut best = BoardEvaluation::identity(maximizing);
        for mv in moves {
            let next = position.play(&mv);
            let child = self.alpha_beta(&next, alpha, beta, depth - 1, !maximizing)?;
            best.consider(BoardEvaluation::from_child(child, mv), maximizing);

            if maximizing {
                alpha = alpha.max(best.score);
                if best.score >= beta {
                    self.stats.cutoffs.fetch_add(1, Ordering::Relaxed);
                    return Ok(best);
                }
            } else {
                beta = beta.min(best.score);
                if best.score <= alpha {
                    self.stats.cutoffs.fetch_add(1, Ordering::Relaxed);
                    return Ok(best);
                }
            }
        }

        Ok(best)
    }

    fn leaf<P>(&self, position: &P) -> Score
    where
        P: Position,
        E: Evaluate<P>,
    {
        self.stats.evaluations.fetch_add(1, Ordering::Relaxed);
        self.evaluator.evaluate(position, self.perspective)
    }
}

/// Return value of [`Search::alpha_beta`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardEvaluation<M> {
    /// The best move found in this subtree
    pub mv: Option<M>,
    /// The score of this subtree, for the side being maximized
    pub score: Score,
    /// Whether this subtree was cut short by the clock
    pub terminated_early: bool,
}

impl<M> BoardEvaluation<M> {
    /// Constructs a [`BoardEvaluation`] from an evaluation coming out of a subtree,
    /// pasting in the move that leads to the child
    fn from_child<C>(child: BoardEvaluation<C>, mv: M) -> Self {
        Self {
            mv: Some(mv),
            score: child.score,
            // If they terminated early, then so did we, technically
            terminated_early: child.terminated_early,
        }
    }

    /// A leaf score: depth limit or terminal position
    fn score(score: Score) -> Self {
        Self {
            mv: None,
            score,
            terminated_early: false,
        }
    }

    /// A leaf score given because the clock ran out
    fn score_early(score: Score) -> Self {
        Self {
            mv: None,
            score,
            terminated_early: true,
        }
    }

    /// The starting point before any child is seen: worse than everything for the side to act
    fn identity(maximizing: bool) -> Self {
        Self::score(if maximizing { Score::min() } else { Score::max() })
    }

    /// Takes `other` if it is strictly better for the side to act, or if nothing was taken yet
    fn consider(&mut self, other: Self, maximizing: bool) {
        let terminated_early = self.terminated_early || other.terminated_early;
        let better = if maximizing {
            other.score > self.score
        } else {
            other.score < self.score
        };

        if self.mv.is_none() || better {
            *self = other;
        }
        self.terminated_early = terminated_early;
    }
}
