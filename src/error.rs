//! Canonical error and result types for the crate.
//!
//! `FixtureError` is the single surface returned by fixture creation and
//! suite teardown. Per-batch teardown failures are aggregated into
//! [`AggregateFailure`] before they reach the caller.

use thiserror::Error;

use crate::{
    directory::DirectoryError,
    fixture::FixtureName,
    registry::RegistryError,
    teardown::AggregateFailure,
};

/// Top-level error type exposed by `fresh_fixtures`.
#[derive(Debug, Error)]
pub enum FixtureError {
    /// The freshened specs do not cover the request one-for-one: some names
    /// have no spec, or were requested more than once.
    #[error("failed to get required users: {}", shortfall(.missing, .duplicated))]
    MissingFixtureSpec {
        /// Requested names without a matching spec.
        missing: Vec<FixtureName>,
        /// Names requested more than once, each listed once.
        duplicated: Vec<FixtureName>,
    },
    /// The user directory refused to create the fixtures.
    #[error(transparent)]
    Directory(#[from] DirectoryError),
    /// The registry was used outside its lifecycle.
    #[error(transparent)]
    Registry(#[from] RegistryError),
    /// At least one batch could not be deleted during teardown.
    #[error(transparent)]
    Teardown(#[from] AggregateFailure),
}

fn join_names(names: &[FixtureName]) -> String {
    names
        .iter()
        .map(FixtureName::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

fn shortfall(missing: &[FixtureName], duplicated: &[FixtureName]) -> String {
    let mut parts = Vec::new();
    if !missing.is_empty() {
        parts.push(format!("missing {}", join_names(missing)));
    }
    if !duplicated.is_empty() {
        parts.push(format!("duplicated {}", join_names(duplicated)));
    }
    parts.join("; ")
}

/// Result alias used by `fresh_fixtures` public APIs.
pub type Result<T> = std::result::Result<T, FixtureError>;
