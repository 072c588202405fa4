use std::time::{Duration, Instant};

use anyhow::{Context, bail, ensure};
use log::{debug, info, warn};

use crate::{config::AgentConfig, game::Position};
use evaluation::HeuristicEvaluator;
use opening::{Layout, OpeningBook};
use search::Search;
use transposition::{CacheSnapshot, PositionCache};

pub mod evaluation;
pub mod opening;
pub mod search;
pub mod transposition;

/// A [`Duration`] subtracted from each move's thinking time, to make sure we don't accidentally go over
///
/// Our time to respond is usually slightly higher than our planned thinking time,
/// because it takes some time to unwind the search and hand the move back to the match runner
const SLACK_TIME: Duration = Duration::from_millis(20);

/// The player: picks one move per turn, for a whole match
///
/// Owns the evaluation cache and the opening book state across turns.
#[derive(Debug)]
pub struct Agent {
    debug: bool,

    config: AgentConfig,
    evaluator: HeuristicEvaluator,
    /// Set on the first turn of a match, once the starting layout is known
    book: Option<OpeningBook>,
}

impl Agent {
    pub fn new(config: AgentConfig) -> Self {
        let evaluator = HeuristicEvaluator::new(
            config.weights,
            PositionCache::with_capacity(config.cache_capacity),
        );

        Self {
            debug: false,
            config,
            evaluator,
            book: None,
        }
    }

    /// Sets the debug flag
    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
    }

    /// Whether debugging is enabled
    pub fn debug(&self) -> bool {
        self.debug
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Resets the internal state for a new match
    ///
    /// Empties the cache and forgets the starting layout; keeps the configuration and the debug flag
    pub fn reset_game(&mut self) {
        self.evaluator.clear_cache();
        self.book = None;
    }

    /// The starting layout detected this match, if a turn has been played yet
    pub fn layout(&self) -> Option<Layout> {
        self.book.as_ref().map(OpeningBook::layout)
    }

    /// A diagnostic dump of the evaluation cache
    pub fn cache_snapshot(&self) -> CacheSnapshot {
        self.evaluator.cache().lock().snapshot()
    }

    /// Determines when the search must stop, given the time budget for this move
    ///
    /// [`SLACK_TIME`] is taken off the budget, to account for unwinding the search.
    /// No budget means no stop time.
    fn calculate_stop_time(
        start: Instant,
        time_budget: Option<Duration>,
    ) -> anyhow::Result<Option<Instant>> {
        time_budget
            .map(|budget| {
                start
                    .checked_add(budget.saturating_sub(SLACK_TIME))
                    .context("Failed to add thinking time to current instant")
            })
            .transpose()
    }

    /// Picks the move to play in `position`
    ///
    /// During the first plies of a match from a known layout, this is a book move.
    /// Otherwise it is the result of a fixed-depth search.
    /// `time_budget` bounds the search; when it runs out, the best move found so far is played.
    pub fn choose_move<P>(
        &mut self,
        position: &P,
        time_budget: Option<Duration>,
    ) -> anyhow::Result<P::Move>
    where
        P: Position + Sync,
        P::Move: Send,
    {
        let start = Instant::now();

        if position.is_terminal() {
            bail!("Asked to move in a finished game (ply {})", position.ply());
        }
        ensure!(
            self.config.search_depth > 0,
            "Search depth must be at least 1"
        );

        if let Some(mv) = self.book_move(position) {
            info!("ply {}: book move {:?}", position.ply(), mv);
            return Ok(mv);
        }

        let stop_time = Self::calculate_stop_time(start, time_budget)?;
        let depth = self.config.search_depth;
        let search =
            Search::new(&self.evaluator, position.side_to_move()).with_stop_time(stop_time);

        let eval = if self.config.parallel_root {
            search.search_root_parallel(position, depth)
        } else {
            search.search_root(position, depth)
        }
        .with_context(|| format!("Search failed at ply {}", position.ply()))?;

        if eval.terminated_early {
            warn!(
                "ply {}: out of time before finishing depth {}, playing the best move found so far",
                position.ply(),
                depth
            );
        }

        let mv = match eval.mv {
            Some(mv) => mv,
            // The clock ran out before a single child was searched
            None => position
                .legal_moves()
                .into_iter()
                .next()
                .context("Asked to search on a position with no legal moves")?,
        };

        let stats = search.stats();
        info!(
            "ply {}: {:?} score {} depth {} nodes {} time {}ms",
            position.ply(),
            mv,
            eval.score,
            depth,
            stats.nodes(),
            start.elapsed().as_millis()
        );
        if self.debug {
            let cache = self.evaluator.cache().lock();
            debug!(
                "evaluations {} cutoffs {} cache {}/{} hits {} misses {}",
                stats.evaluations(),
                stats.cutoffs(),
                cache.len(),
                cache.capacity(),
                cache.hits(),
                cache.misses()
            );
        }

        Ok(mv)
    }

    /// The opening book's move for `position`, if it has one and the rules engine accepts it
    ///
    /// The starting layout is detected on the first call of each match.
    fn book_move<P: Position>(&mut self, position: &P) -> Option<P::Move> {
        if !self.config.opening_book {
            return None;
        }

        let book = self.book.get_or_insert_with(|| {
            let layout = Layout::detect(position.grid(), position.ply());
            debug!("starting layout detected as {:?}", layout);
            OpeningBook::new(layout)
        });

        let (from, to) = book.lookup(position.grid(), position.ply(), position.side_to_move())?;
        let mv = position.find_move(from, to);
        if mv.is_none() {
            warn!("book move {} -> {} is not legal here, searching instead", from, to);
        }
        mv
    }
}

impl Default for Agent {
    fn default() -> Self {
        Self::new(AgentConfig::default())
    }
}
