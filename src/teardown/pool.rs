//! Bounded pool running deletion units.

use std::{future::Future, sync::Arc, time::Duration};

use log::warn;
use tokio::{sync::Semaphore, time::sleep};
use tokio_util::task::TaskTracker;

use super::Ordinal;
use crate::config::TeardownConfig;

/// Fixed-size pool of deletion workers, reusable across teardown passes.
///
/// Units beyond the worker count queue for a permit. Units running past the
/// overrun threshold are reported and left to finish.
#[derive(Clone, Debug)]
pub struct WorkerPool {
    permits: Arc<Semaphore>,
    tracker: TaskTracker,
    workers: usize,
    overrun_warning: Duration,
}

impl WorkerPool {
    /// Build a pool from normalised settings.
    #[must_use]
    pub fn new(config: &TeardownConfig) -> Self {
        let config = config.normalized();
        Self {
            permits: Arc::new(Semaphore::new(config.workers)),
            tracker: TaskTracker::new(),
            workers: config.workers,
            overrun_warning: config.overrun_warning,
        }
    }

    /// Number of units allowed to run at once.
    #[inline]
    #[must_use]
    pub const fn worker_count(&self) -> usize { self.workers }

    /// Number of units queued or running.
    #[must_use]
    pub fn in_flight(&self) -> usize { self.tracker.len() }

    /// Queue `unit` for execution under a worker permit.
    ///
    /// `ordinal` only labels overrun warnings.
    pub fn submit<Fut>(&self, ordinal: Ordinal, unit: Fut)
    where
        Fut: Future<Output = ()> + Send + 'static,
    {
        let permits = Arc::clone(&self.permits);
        let threshold = self.overrun_warning;
        self.tracker.spawn(async move {
            let Ok(_permit) = permits.acquire_owned().await else {
                return;
            };
            let mut unit = std::pin::pin!(unit);
            tokio::select! {
                () = &mut unit => {}
                () = sleep(threshold) => {
                    warn!("teardown unit overran: ordinal={ordinal}, threshold={threshold:?}");
                    crate::metrics::inc_overruns();
                    unit.await;
                }
            }
        });
    }

    /// Wait for every queued and running unit, including ones the collector
    /// has already given up on.
    pub async fn drain(&self) {
        self.tracker.close();
        self.tracker.wait().await;
        self.tracker.reopen();
    }
}
