//! Fan-out of deletion units, one per registered batch.

use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::mpsc;

use super::{
    Signal,
    WorkItem,
    outcome::{DeletionFault, Outcome},
    pool::WorkerPool,
};
use crate::{
    directory::UserDirectory,
    registry::{FixtureRegistry, RegistryError},
};

/// Work submitted by one [`dispatch`] call and the channel its units report on.
#[derive(Debug)]
pub struct Dispatched {
    /// Submitted items, ordinals `1..=N`.
    pub items: Vec<WorkItem>,
    /// Receive end for the units' completion signals.
    pub signals: mpsc::Receiver<Signal>,
}

/// Snapshot `registry` and submit one deletion unit per batch to `pool`.
///
/// Returns without waiting for any unit. Each unit sends exactly one
/// [`Signal`]; a send into a closed channel is ignored.
///
/// # Errors
///
/// Returns [`RegistryError::Stopped`] if the registry has been stopped.
pub fn dispatch<D>(
    registry: &FixtureRegistry,
    pool: &WorkerPool,
    directory: &Arc<D>,
) -> Result<Dispatched, RegistryError>
where
    D: UserDirectory + ?Sized,
{
    let items: Vec<WorkItem> = registry
        .list()?
        .into_iter()
        .zip(1..)
        .map(|((_, batch), ordinal)| WorkItem { ordinal, batch })
        .collect();
    let (tx, signals) = mpsc::channel(items.len().max(1));

    for item in &items {
        let tx = tx.clone();
        let directory = Arc::clone(directory);
        let WorkItem { ordinal, batch } = item.clone();
        pool.submit(ordinal, async move {
            let deletion = std::panic::AssertUnwindSafe(
                directory.delete_fixtures(batch.config(), batch.specs()),
            )
            .catch_unwind();

            let outcome = match deletion.await {
                Ok(Ok(())) => Outcome::Success,
                Ok(Err(error)) => Outcome::Failure(error.into()),
                Err(panic) => {
                    let fault = DeletionFault::from_panic(&*panic);
                    tracing::error!(panic = %fault.reason, ordinal, "fixture deletion panicked");
                    Outcome::Failure(fault)
                }
            };
            if tx.send(Signal { ordinal, outcome }).await.is_err() {
                tracing::debug!(ordinal, "collector gone; dropping late teardown signal");
            }
        });
    }
    tracing::debug!(units = items.len(), "teardown units dispatched");
    Ok(Dispatched { items, signals })
}
