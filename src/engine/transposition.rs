use std::{
    collections::{HashMap, VecDeque},
    fmt,
};

use serde::Serialize;

use crate::{board::Side, game::Position};

/// Default number of positions a [`PositionCache`] holds
pub const DEFAULT_CACHE_CAPACITY: usize = 100_000;

/// Cache key of a position: side to move, then every grid cell in row-major order
///
/// Two positions with the same side to move and the same grid contents always share a fingerprint,
/// and positions that differ in any cell or in the side to move never do.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn of<P: Position>(position: &P) -> Self {
        let grid = position.grid();
        let mut key = String::with_capacity(1 + grid.rows() * grid.cols());
        key.push(position.side_to_move().tag());
        key.extend(grid.iter().map(|(_, cell)| cell.tag()));
        Self(key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A bounded memo of heuristic values, keyed by [`Fingerprint`]
///
/// Values are stored from White's point of view; see [`PositionCache::lookup_for`].
/// When full, the oldest inserted position is evicted first (FIFO).
/// The insertion queue always holds exactly the keys of the map,
/// so an eviction can never find the queue empty.
#[derive(Debug, Clone)]
pub struct PositionCache {
    table: HashMap<Fingerprint, f64>,
    order: VecDeque<Fingerprint>,
    capacity: usize,
    hits: u64,
    misses: u64,
}

impl PositionCache {
    /// Creates an empty cache holding at most `capacity` positions
    ///
    /// A capacity of zero disables caching altogether.
    pub fn with_capacity(capacity: usize) -> Self {
        // Capacity is a limit, not a size hint
        let reserve = capacity.min(1 << 16);
        Self {
            table: HashMap::with_capacity(reserve),
            order: VecDeque::with_capacity(reserve),
            capacity,
            hits: 0,
            misses: 0,
        }
    }

    /// The stored value for `position`, or [`None`] on a miss
    pub fn lookup<P: Position>(&mut self, position: &P) -> Option<f64> {
        self.lookup_fingerprint(&Fingerprint::of(position))
    }

    /// The stored value for `position`, turned to `side`'s point of view
    pub fn lookup_for<P: Position>(&mut self, position: &P, side: Side) -> Option<f64> {
        self.lookup(position).map(|white| orient(white, side))
    }

    pub fn lookup_fingerprint(&mut self, key: &Fingerprint) -> Option<f64> {
        let value = self.table.get(key).copied();
        match value {
            Some(_) => self.hits += 1,
            None => self.misses += 1,
        }
        value
    }

    /// Stores `value` for `position`, evicting the oldest entry if the cache is full
    pub fn record<P: Position>(&mut self, position: &P, value: f64) {
        self.record_fingerprint(Fingerprint::of(position), value);
    }

    /// Stores `value`, given from `side`'s point of view, for `position`
    pub fn record_for<P: Position>(&mut self, position: &P, side: Side, value: f64) {
        self.record(position, orient(value, side));
    }

    /// Stores `value` under `key`
    ///
    /// Overwriting a key keeps its place in the eviction order.
    /// Inserting a new key into a full cache evicts first, then inserts.
    pub fn record_fingerprint(&mut self, key: Fingerprint, value: f64) {
        if self.capacity == 0 {
            return;
        }

        if let Some(slot) = self.table.get_mut(&key) {
            *slot = value;
            return;
        }

        if self.table.len() >= self.capacity {
            self.evict_oldest();
        }

        self.order.push_back(key.clone());
        self.table.insert(key, value);
    }

    fn evict_oldest(&mut self) {
        if let Some(oldest) = self.order.pop_front() {
            self.table.remove(&oldest);
        }
    }

    /// Forgets every entry and resets the counters
    pub fn clear(&mut self) {
        self.table.clear();
        self.order.clear();
        self.hits = 0;
        self.misses = 0;
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    /// A diagnostic dump of the cache state
    pub fn snapshot(&self) -> CacheSnapshot {
        CacheSnapshot {
            entries: self.table.len(),
            capacity: self.capacity,
            hits: self.hits,
            misses: self.misses,
            queue: self.order.iter().cloned().collect(),
        }
    }
}

impl Default for PositionCache {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CACHE_CAPACITY)
    }
}

/// Turns a value between White's point of view and `side`'s (in either direction)
#[inline]
pub(crate) fn orient(value: f64, side: Side) -> f64 {
    match side {
        Side::White => value,
        Side::Black => -value,
    }
}

/// Diagnostic view of a [`PositionCache`]; not a stable format
#[derive(Debug, Clone, Serialize)]
pub struct CacheSnapshot {
    pub entries: usize,
    pub capacity: usize,
    pub hits: u64,
    pub misses: u64,
    /// Fingerprints in eviction order, oldest first
    pub queue: Vec<Fingerprint>,
}

impl CacheSnapshot {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
