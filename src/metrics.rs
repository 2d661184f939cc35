//! Metric helpers for `fresh_fixtures`.
//!
//! This module defines metric names and thin wrappers around the
//! [`metrics`](https://docs.rs/metrics) crate. With the `metrics` feature
//! disabled every helper is a no-op.

#[cfg(feature = "metrics")]
use metrics::counter;

use crate::teardown::Outcome;

/// Name of the counter tracking recorded fixture batches.
pub const BATCHES_CREATED: &str = "fresh_fixtures_batches_created_total";
/// Name of the counter tracking batches that failed to delete.
pub const TEARDOWN_FAILURES: &str = "fresh_fixtures_teardown_failures_total";
/// Name of the counter tracking deletion units that ran past the overrun threshold.
pub const TEARDOWN_OVERRUNS: &str = "fresh_fixtures_teardown_overruns_total";

fn failure_label(outcome: &Outcome) -> &'static str {
    match outcome {
        Outcome::Success => "none",
        Outcome::Failure(_) => "fault",
        Outcome::Timeout => "timeout",
    }
}

/// Record a newly registered batch.
pub fn inc_batches_created() {
    #[cfg(feature = "metrics")]
    counter!(BATCHES_CREATED).increment(1);
}

/// Record a batch that failed to delete, labelled by its outcome.
pub fn inc_teardown_failures(outcome: &Outcome) {
    let reason = failure_label(outcome);
    #[cfg(feature = "metrics")]
    counter!(TEARDOWN_FAILURES, "reason" => reason).increment(1);
    #[cfg(not(feature = "metrics"))]
    let _ = reason;
}

/// Record a deletion unit that overran its threshold.
pub fn inc_overruns() {
    #[cfg(feature = "metrics")]
    counter!(TEARDOWN_OVERRUNS).increment(1);
}
