//! Concurrent, failure-tolerant deletion of every registered fixture batch.
//!
//! A teardown pass snapshots the registry, submits one deletion unit per
//! batch to a [`WorkerPool`] and collects the units' signals under a
//! per-wait timeout. The registry is cleared only when every unit succeeded;
//! after any failure it is left untouched so the whole pass can be retried.

mod collect;
mod dispatch;
mod outcome;
mod pool;

use std::{sync::Arc, time::Duration};

pub use collect::collect;
pub use dispatch::{Dispatched, dispatch};
pub use outcome::{AggregateFailure, DeletionFault, FailedBatch, FaultClass, Outcome};
pub use pool::WorkerPool;

use crate::{
    directory::UserDirectory,
    error::Result,
    fixture::FixtureBatch,
    registry::FixtureRegistry,
};

/// Dense `1..=N` index correlating a unit's signal with its batch.
pub type Ordinal = usize;

/// A batch submitted for deletion.
#[derive(Clone, Debug, PartialEq)]
pub struct WorkItem {
    /// Index assigned at dispatch; carries no ordering guarantee.
    pub ordinal: Ordinal,
    /// Batch to delete.
    pub batch: FixtureBatch,
}

/// Completion report sent by a deletion unit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signal {
    /// Ordinal of the reporting unit.
    pub ordinal: Ordinal,
    /// [`Outcome::Success`] or [`Outcome::Failure`].
    pub outcome: Outcome,
}

/// Delete every batch in `registry`, clearing it only if all succeed.
///
/// # Errors
///
/// Returns [`FixtureError::Teardown`] carrying every failed batch, or
/// [`FixtureError::Registry`] if the registry has been stopped.
///
/// [`FixtureError::Teardown`]: crate::FixtureError::Teardown
/// [`FixtureError::Registry`]: crate::FixtureError::Registry
pub async fn clean<D>(
    registry: &FixtureRegistry,
    pool: &WorkerPool,
    directory: &Arc<D>,
    window: Duration,
) -> Result<()>
where
    D: UserDirectory + ?Sized,
{
    let Dispatched { items, signals } = dispatch(registry, pool, directory)?;
    if items.is_empty() {
        tracing::debug!("no fixture batches registered; nothing to delete");
        return Ok(());
    }

    let batches = items.len();
    match collect(signals, items, window).await {
        Ok(()) => {
            registry.clear_all()?;
            tracing::info!(batches, "fixture teardown complete");
            Ok(())
        }
        Err(failure) => {
            for failed in &failure.failures {
                crate::metrics::inc_teardown_failures(&failed.outcome);
            }
            tracing::error!(
                batches,
                failed = failure.count(),
                timeouts = failure.timeouts(),
                "fixture teardown failed; registry left intact"
            );
            Err(failure.into())
        }
    }
}
