//! Gathering unit signals into a single teardown result.

use std::{collections::BTreeMap, time::Duration};

use tokio::{sync::mpsc, time::timeout};

use super::{
    Signal,
    WorkItem,
    outcome::{AggregateFailure, DeletionFault, FailedBatch, Outcome},
};

/// Wait until every item in `items` has reported or the window closes.
///
/// `window` bounds each individual wait and restarts whenever a signal
/// arrives, so a pass that keeps making progress is never cut short. When a
/// wait elapses, every item still pending is marked [`Outcome::Timeout`] and
/// collection stops immediately. Units still running keep going; their late
/// signals are dropped with the receiver.
///
/// # Errors
///
/// Returns [`AggregateFailure`] listing every failed or timed-out item,
/// ordered by ordinal.
pub async fn collect(
    mut signals: mpsc::Receiver<Signal>,
    items: Vec<WorkItem>,
    window: Duration,
) -> Result<(), AggregateFailure> {
    let mut pending: BTreeMap<_, _> = items
        .into_iter()
        .map(|item| (item.ordinal, item.batch))
        .collect();
    let mut failures = Vec::new();

    while !pending.is_empty() {
        match timeout(window, signals.recv()).await {
            Ok(Some(Signal { ordinal, outcome })) => {
                let Some(batch) = pending.remove(&ordinal) else {
                    tracing::debug!(ordinal, "ignoring signal for unknown or settled item");
                    continue;
                };
                match outcome {
                    Outcome::Success => {}
                    Outcome::Failure(_) | Outcome::Timeout => failures.push(FailedBatch {
                        ordinal,
                        batch,
                        outcome,
                    }),
                }
            }
            Ok(None) => {
                tracing::warn!(pending = pending.len(), "teardown units exited without reporting");
                failures.extend(std::mem::take(&mut pending).into_iter().map(
                    |(ordinal, batch)| FailedBatch {
                        ordinal,
                        batch,
                        outcome: Outcome::Failure(DeletionFault::abandoned()),
                    },
                ));
            }
            Err(_elapsed) => {
                tracing::warn!(pending = pending.len(), ?window, "teardown collection timed out");
                failures.extend(std::mem::take(&mut pending).into_iter().map(
                    |(ordinal, batch)| FailedBatch {
                        ordinal,
                        batch,
                        outcome: Outcome::Timeout,
                    },
                ));
            }
        }
    }

    if failures.is_empty() {
        return Ok(());
    }
    failures.sort_by_key(|failure| failure.ordinal);
    Err(AggregateFailure { failures })
}
