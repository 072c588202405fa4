//! See [`AgentConfig`]

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine::{evaluation::Weights, transposition::DEFAULT_CACHE_CAPACITY};

/// Tuning knobs of an [`Agent`](crate::engine::Agent)
///
/// Missing fields take their default when deserialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Plies searched below the root; fixed for the whole match
    pub search_depth: u8,
    /// Positions kept in the evaluation cache
    pub cache_capacity: usize,
    pub weights: Weights,
    /// Play book moves during the first plies from a known layout
    pub opening_book: bool,
    /// Search the root's children on the rayon thread pool
    pub parallel_root: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            search_depth: 3,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            weights: Weights::default(),
            opening_book: true,
            parallel_root: false,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("search depth must be at least 1")]
    ZeroDepth,
    #[error("weight {name} is not a finite number")]
    NonFiniteWeight { name: &'static str },
    #[error("malformed configuration")]
    Parse(#[from] serde_json::Error),
}

impl AgentConfig {
    /// Reads and validates a JSON configuration
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.search_depth == 0 {
            return Err(ConfigError::ZeroDepth);
        }

        let weights = [
            ("material", self.weights.material),
            ("center_control", self.weights.center_control),
            ("clustering", self.weights.clustering),
        ];
        if let Some((name, _)) = weights.into_iter().find(|(_, w)| !w.is_finite()) {
            return Err(ConfigError::NonFiniteWeight { name });
        }

        Ok(())
    }
}
