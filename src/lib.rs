#![doc(html_root_url = "https://docs.rs/fresh_fixtures/latest")]
//! Public API for the `fresh_fixtures` library.
//!
//! This crate creates uniquely named test fixtures ("fresh users") for
//! protocol test suites and tears them down afterwards with a bounded,
//! failure-tolerant worker pool.

pub mod config;
pub mod directory;
pub mod error;
pub mod fixture;
pub mod freshen;
pub mod metrics;
pub mod registry;
pub mod suffix;
pub mod suite;
pub mod teardown;

pub use config::{ConfigError, MIN_COLLECT_TIMEOUT, TeardownConfig};
pub use directory::{
    ConfigValue,
    DirectoryConfig,
    DirectoryError,
    FIXTURE_SPECS_KEY,
    SpecTable,
    UserDirectory,
};
pub use error::{FixtureError, Result};
pub use fixture::{
    AttributeValue,
    FixtureBatch,
    FixtureName,
    FixtureRequest,
    FixtureSpec,
    IDENTITY_KEY,
};
pub use freshen::{fresh_specs, freshen, freshen_one};
pub use registry::{FixtureRegistry, RegistryError};
pub use suffix::Suffix;
pub use suite::FixtureSuite;
pub use teardown::{
    AggregateFailure,
    DeletionFault,
    FailedBatch,
    FaultClass,
    Ordinal,
    Outcome,
    WorkItem,
    WorkerPool,
};
