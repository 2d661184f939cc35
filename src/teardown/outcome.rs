//! Per-batch outcomes and the aggregate failure raised by `clean`.

use std::{any::Any, fmt};

use thiserror::Error;

use super::Ordinal;
use crate::{directory::DirectoryError, fixture::FixtureBatch};

/// Broad cause of a deletion fault.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FaultClass {
    /// The directory returned an error.
    Error,
    /// The directory panicked while deleting.
    Panic,
    /// The worker exited without reporting.
    Abandoned,
}

impl FaultClass {
    fn as_str(self) -> &'static str {
        match self {
            FaultClass::Error => "error",
            FaultClass::Panic => "panic",
            FaultClass::Abandoned => "abandoned",
        }
    }
}

/// Why deleting one batch failed.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{}: {reason}", .class.as_str())]
pub struct DeletionFault {
    /// Broad cause.
    pub class: FaultClass,
    /// Detail from the directory or the panic payload.
    pub reason: String,
}

impl DeletionFault {
    pub(crate) fn abandoned() -> Self {
        Self {
            class: FaultClass::Abandoned,
            reason: "worker exited without reporting".to_owned(),
        }
    }

    /// Fault for a deletion that panicked with `payload`.
    ///
    /// String payloads are kept verbatim; anything else is reported by its
    /// `Debug` form.
    #[must_use]
    pub fn from_panic(payload: &(dyn Any + Send)) -> Self {
        let reason = payload
            .downcast_ref::<String>()
            .cloned()
            .or_else(|| payload.downcast_ref::<&'static str>().map(|s| (*s).to_owned()))
            .unwrap_or_else(|| format!("{payload:?}"));
        Self {
            class: FaultClass::Panic,
            reason,
        }
    }
}

impl From<DirectoryError> for DeletionFault {
    fn from(error: DirectoryError) -> Self {
        Self {
            class: FaultClass::Error,
            reason: error.to_string(),
        }
    }
}

/// Result of attempting to delete one batch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The directory deleted every fixture in the batch.
    Success,
    /// The directory failed or the worker was lost.
    Failure(DeletionFault),
    /// No signal arrived within the collection window.
    Timeout,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Success => f.write_str("success"),
            Outcome::Failure(fault) => write!(f, "{fault}"),
            Outcome::Timeout => f.write_str("timeout"),
        }
    }
}

/// A batch that could not be deleted.
#[derive(Clone, Debug, PartialEq)]
pub struct FailedBatch {
    /// Ordinal assigned at dispatch.
    pub ordinal: Ordinal,
    /// Batch that is still registered.
    pub batch: FixtureBatch,
    /// Either [`Outcome::Failure`] or [`Outcome::Timeout`].
    pub outcome: Outcome,
}

impl FailedBatch {
    /// Returns `true` if the batch never reported within the window.
    #[must_use]
    pub fn is_timeout(&self) -> bool { matches!(self.outcome, Outcome::Timeout) }
}

impl fmt::Display for FailedBatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let identities: Vec<&str> = self.batch.identities().collect();
        write!(f, "#{} {identities:?}: {}", self.ordinal, self.outcome)
    }
}

/// Every batch that failed during one teardown pass, ordered by ordinal.
#[derive(Clone, Debug, PartialEq, Error)]
#[error("{} fixture batch(es) failed to delete: {}", .failures.len(), describe(.failures))]
pub struct AggregateFailure {
    /// Failed batches, ordered by ordinal.
    pub failures: Vec<FailedBatch>,
}

fn describe(failures: &[FailedBatch]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl AggregateFailure {
    /// Number of failed batches.
    #[must_use]
    pub fn count(&self) -> usize { self.failures.len() }

    /// Number of failures caused by the collection window closing.
    #[must_use]
    pub fn timeouts(&self) -> usize { self.failures.iter().filter(|f| f.is_timeout()).count() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        directory::DirectoryConfig,
        fixture::{FixtureName, FixtureSpec},
    };

    fn batch(identity: &str) -> FixtureBatch {
        FixtureBatch::new(
            DirectoryConfig::new(),
            vec![(
                FixtureName::from("alice"),
                FixtureSpec::new().with("username", identity),
            )],
        )
    }

    #[test]
    fn panic_payloads_become_readable_faults() {
        let fault = DeletionFault::from_panic(&String::from("kaboom"));
        assert_eq!(fault.to_string(), "panic: kaboom");
        assert_eq!(DeletionFault::from_panic(&"static").reason, "static");
        assert!(DeletionFault::from_panic(&5_u32).reason.contains("Any"));
    }

    #[test]
    fn aggregate_message_enumerates_failures() {
        let failure = AggregateFailure {
            failures: vec![
                FailedBatch {
                    ordinal: 1,
                    batch: batch("alice1.5"),
                    outcome: Outcome::Failure(DirectoryError::delete("no such user").into()),
                },
                FailedBatch {
                    ordinal: 3,
                    batch: batch("alice2.5"),
                    outcome: Outcome::Timeout,
                },
            ],
        };
        assert_eq!(failure.count(), 2);
        assert_eq!(failure.timeouts(), 1);
        assert_eq!(
            failure.to_string(),
            "2 fixture batch(es) failed to delete: #1 [\"alice1.5\"]: error: delete failed: no \
             such user; #3 [\"alice2.5\"]: timeout"
        );
    }
}
