//! See [`Score`]

use std::{cmp::Ordering, fmt, ops::Neg};

use serde::{Deserialize, Serialize};

/// Heuristic desirability of a position
///
/// Scores are always relative to some side: higher is better for that side.
/// Unlike a bare `f64`, scores are totally ordered (see [`f64::total_cmp`]),
/// so they can be compared, maxed and minned without special-casing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Score(f64);

impl Score {
    /// Create [`Self`] from a raw value
    ///
    /// Negative zero is folded into positive zero, so that a score and its double negation compare equal.
    #[inline]
    pub fn new(value: f64) -> Self {
        Self(value + 0.0)
    }

    /// The raw value
    #[inline]
    pub fn value(self) -> f64 {
        self.0
    }

    /// Semantically inverts `self`, to evaluate this score from the opponent's perspective
    #[inline]
    pub fn negate(self) -> Self {
        Self::new(-self.0)
    }

    /// The minimum possible score, -∞
    #[inline]
    pub fn min() -> Self {
        Self(f64::NEG_INFINITY)
    }

    /// The maximum possible score, +∞
    #[inline]
    pub fn max() -> Self {
        Self(f64::INFINITY)
    }
}

impl Neg for Score {
    type Output = Self;

    fn neg(self) -> Self {
        self.negate()
    }
}

impl From<f64> for Score {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl From<Score> for f64 {
    fn from(value: Score) -> Self {
        value.0
    }
}

impl Ord for Score {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl PartialOrd for Score {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Score {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Score {}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}", self.0)
    }
}
