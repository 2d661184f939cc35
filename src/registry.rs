//! Registry of fixture batches awaiting teardown.
//!
//! The table lives inside an owning task started by
//! [`FixtureRegistry::start`]. Handles keep only a weak reference, so once
//! [`FixtureRegistry::stop`] terminates the owner the table is released and
//! every remaining handle reports [`RegistryError::Stopped`].
//!
//! The map tolerates concurrent readers and writers, but the registry adds
//! no further locking: callers must only [`clear_all`] once fixture creation
//! has quiesced.
//!
//! [`clear_all`]: FixtureRegistry::clear_all
use std::sync::{Arc, Weak};

use dashmap::DashMap;
use log::warn;
use thiserror::Error;
use tokio_util::{sync::CancellationToken, task::TaskTracker};

use crate::{fixture::FixtureBatch, suffix::Suffix};

type Table = DashMap<Suffix, FixtureBatch>;

/// Errors raised when using a registry handle.
#[non_exhaustive]
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RegistryError {
    /// The owning task has exited and the table was released.
    #[error("fixture registry has been stopped")]
    Stopped,
}

/// Handle to the lifecycle-scoped batch table.
#[derive(Clone, Debug)]
pub struct FixtureRegistry {
    table: Weak<Table>,
    shutdown: CancellationToken,
    tracker: TaskTracker,
}

impl FixtureRegistry {
    /// Spawn the owning task with an empty table and return a handle to it.
    ///
    /// Must be called from within a Tokio runtime.
    #[must_use]
    pub fn start() -> Self {
        let table = Arc::new(Table::new());
        let handle = Arc::downgrade(&table);
        let shutdown = CancellationToken::new();
        let tracker = TaskTracker::new();

        let token = shutdown.clone();
        tracker.spawn(async move {
            token.cancelled().await;
            tracing::debug!(entries = table.len(), "fixture registry released");
            drop(table);
        });
        tracker.close();
        tracing::debug!("fixture registry started");

        Self {
            table: handle,
            shutdown,
            tracker,
        }
    }

    /// Terminate the owning task and wait for it to release the table.
    pub async fn stop(self) {
        self.shutdown.cancel();
        self.tracker.wait().await;
    }

    /// Returns `true` until [`stop`](Self::stop) has taken effect.
    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.shutdown.is_cancelled() && self.table.strong_count() > 0
    }

    fn table(&self) -> Result<Arc<Table>, RegistryError> {
        self.table.upgrade().ok_or(RegistryError::Stopped)
    }

    /// Record the batch created under `suffix`.
    ///
    /// An existing entry for the same suffix is overwritten. Its fixtures are
    /// no longer tracked, so the collision is logged.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Stopped`] once the registry has been stopped.
    pub fn record(&self, suffix: Suffix, batch: FixtureBatch) -> Result<(), RegistryError> {
        let table = self.table()?;
        if let Some(previous) = table.insert(suffix.clone(), batch) {
            let lost: Vec<&str> = previous.identities().collect();
            warn!(
                "fixture suffix collision, untracking earlier batch: suffix={suffix}, \
                 lost={lost:?}"
            );
        }
        Ok(())
    }

    /// Point-in-time snapshot of every entry, in no particular order.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Stopped`] once the registry has been stopped.
    pub fn list(&self) -> Result<Vec<(Suffix, FixtureBatch)>, RegistryError> {
        let table = self.table()?;
        Ok(table
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect())
    }

    /// Remove every entry.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Stopped`] once the registry has been stopped.
    pub fn clear_all(&self) -> Result<(), RegistryError> {
        self.table()?.clear();
        Ok(())
    }

    /// Returns `true` if a batch is recorded under `suffix`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Stopped`] once the registry has been stopped.
    pub fn contains(&self, suffix: &Suffix) -> Result<bool, RegistryError> {
        Ok(self.table()?.contains_key(suffix))
    }

    /// Number of recorded batches.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Stopped`] once the registry has been stopped.
    pub fn len(&self) -> Result<usize, RegistryError> { Ok(self.table()?.len()) }

    /// Returns `true` when no batch is recorded.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Stopped`] once the registry has been stopped.
    pub fn is_empty(&self) -> Result<bool, RegistryError> { Ok(self.table()?.is_empty()) }
}
