//! Teardown configuration.
//!
//! [`TeardownConfig`] sizes the worker pool and sets the two timing knobs
//! used during `clean`: the advisory overrun warning for a single deletion
//! and the per-wait collection window.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Smallest collection window accepted after normalisation.
pub const MIN_COLLECT_TIMEOUT: Duration = Duration::from_millis(10);

/// Errors returned when validating a [`TeardownConfig`].
#[non_exhaustive]
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The pool was configured without workers.
    #[error("invalid worker count 0; must be >= 1")]
    NoWorkers,
    /// The collection window is below [`MIN_COLLECT_TIMEOUT`].
    #[error("collect timeout {0:?} is below the minimum of {min:?}", min = MIN_COLLECT_TIMEOUT)]
    CollectTimeoutTooShort(Duration),
}

/// Worker pool and timing settings for fixture teardown.
///
/// # Default Values
/// - `workers`: 10
/// - `overrun_warning`: 3 seconds
/// - `collect_timeout`: 20 seconds
///
/// # Invariants
/// - `workers` must be at least 1
/// - `collect_timeout` must be at least [`MIN_COLLECT_TIMEOUT`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeardownConfig {
    /// Maximum number of deletions running at once.
    pub workers: usize,
    /// Deletions running longer than this are reported; they keep running.
    #[serde(with = "millis")]
    pub overrun_warning: Duration,
    /// How long the collector waits for the next signal before giving up on
    /// every pending batch. Restarts whenever a signal arrives.
    #[serde(with = "millis")]
    pub collect_timeout: Duration,
}

impl Default for TeardownConfig {
    fn default() -> Self {
        Self {
            workers: 10,
            overrun_warning: Duration::from_millis(3000),
            collect_timeout: Duration::from_millis(20_000),
        }
    }
}

impl TeardownConfig {
    /// Set the worker pool size.
    #[must_use]
    pub fn workers(mut self, count: usize) -> Self {
        self.workers = count;
        self
    }

    /// Set the overrun warning threshold.
    #[must_use]
    pub fn overrun_warning(mut self, threshold: Duration) -> Self {
        self.overrun_warning = threshold;
        self
    }

    /// Set the per-wait collection window.
    #[must_use]
    pub fn collect_timeout(mut self, window: Duration) -> Self {
        self.collect_timeout = window;
        self
    }

    /// Check the configuration without adjusting it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoWorkers`] for an empty pool and
    /// [`ConfigError::CollectTimeoutTooShort`] when the window is below the
    /// floor.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == 0 {
            return Err(ConfigError::NoWorkers);
        }
        if self.collect_timeout < MIN_COLLECT_TIMEOUT {
            return Err(ConfigError::CollectTimeoutTooShort(self.collect_timeout));
        }
        Ok(())
    }

    /// Clamp every setting to its floor.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    ///
    /// use fresh_fixtures::TeardownConfig;
    ///
    /// let cfg = TeardownConfig::default()
    ///     .workers(0)
    ///     .collect_timeout(Duration::ZERO)
    ///     .normalized();
    /// assert_eq!(cfg.workers, 1);
    /// assert_eq!(cfg.collect_timeout, Duration::from_millis(10));
    /// ```
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.workers = self.workers.max(1);
        self.overrun_warning = self.overrun_warning.max(Duration::from_millis(1));
        self.collect_timeout = self.collect_timeout.max(MIN_COLLECT_TIMEOUT);
        self
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
