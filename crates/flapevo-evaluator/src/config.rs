//! Episode-level configuration.

use std::{num::NonZeroUsize, thread, time::Duration};

use flapevo_engine::{WorldConfig, WorldConfigError};
use serde::{Deserialize, Serialize};

/// Error returned when an [`EpisodeConfig`] is rejected at episode construction.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum ConfigError {
    #[display("invalid world: {_0}")]
    World(WorldConfigError),
    #[display("tick budget must be at least 1")]
    #[from(ignore)]
    ZeroTickBudget,
    #[display("worker count must be at least 1")]
    #[from(ignore)]
    ZeroWorkers,
    #[display("decision timeout must be at least 1ms")]
    #[from(ignore)]
    ZeroTimeout,
}

/// Configuration for a single episode.
///
/// # Example
///
/// ```
/// use flapevo_evaluator::config::EpisodeConfig;
///
/// let config: EpisodeConfig =
///     serde_json::from_str(r#"{ "success_score": 5, "world": { "gap_height": 180.0 } }"#).unwrap();
/// assert_eq!(config.success_score, 5);
/// assert_eq!(config.world.gap_height, 180.0);
/// config.validate().unwrap();
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EpisodeConfig {
    pub world: WorldConfig,
    /// The episode succeeds once the score exceeds this value
    pub success_score: u32,
    /// Maximum number of ticks before the episode is stopped
    pub tick_budget: u64,
    /// Worker threads used for decision gathering (`None` = available parallelism)
    pub workers: Option<usize>,
    /// Decisions taking longer than this are discarded as "no jump"
    pub decision_timeout_ms: Option<u64>,
}

impl Default for EpisodeConfig {
    fn default() -> Self {
        Self {
            world: WorldConfig::default(),
            success_score: 20,
            tick_budget: 100_000,
            workers: None,
            decision_timeout_ms: None,
        }
    }
}

impl EpisodeConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.world.validate()?;
        if self.tick_budget == 0 {
            return Err(ConfigError::ZeroTickBudget);
        }
        if self.workers == Some(0) {
            return Err(ConfigError::ZeroWorkers);
        }
        if self.decision_timeout_ms == Some(0) {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }

    /// Returns the number of decision workers to use.
    #[must_use]
    pub fn worker_count(&self) -> NonZeroUsize {
        self.workers
            .and_then(NonZeroUsize::new)
            .or_else(|| thread::available_parallelism().ok())
            .unwrap_or(NonZeroUsize::MIN)
    }

    #[must_use]
    pub fn decision_timeout(&self) -> Option<Duration> {
        self.decision_timeout_ms.map(Duration::from_millis)
    }
}
