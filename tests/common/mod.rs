//! Shared utilities for integration tests.
//!
//! Provides a spec table of well-known fixtures and helpers for building a
//! suite over a [`ScriptedDirectory`] with short teardown windows.

// Items in this shared module may not be used by all test binaries that import it.
#![allow(
    dead_code,
    reason = "shared test utilities are not used by all test binaries"
)]

use std::{sync::Arc, time::Duration};

use fresh_fixtures::{
    ConfigValue,
    DirectoryConfig,
    FixtureName,
    FixtureSpec,
    FixtureSuite,
    SpecTable,
    TeardownConfig,
};
use fresh_fixtures_testing::ScriptedDirectory;
use rstest::fixture;

/// Shared result type for integration tests.
pub type TestResult<T = ()> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Collection window used by teardown tests.
pub const WINDOW: Duration = Duration::from_millis(100);

/// Names of every fixture in [`spec_table`].
pub const NAMES: [&str; 4] = ["alice", "bob", "kate", "mike"];

/// Spec table with one entry per name in [`NAMES`].
pub fn spec_table() -> SpecTable {
    NAMES
        .into_iter()
        .map(|name| {
            let spec = FixtureSpec::new()
                .with("username", name)
                .with("server", "localhost")
                .with("password", "makota");
            (FixtureName::from(name), spec)
        })
        .collect()
}

/// Configuration holding [`spec_table`] and an unrelated host setting.
#[fixture]
pub fn config() -> DirectoryConfig {
    DirectoryConfig::new()
        .with("host", ConfigValue::Text("localhost".into()))
        .with_fixture_specs(spec_table())
}

/// Teardown settings with small windows suited to paused-clock tests.
pub fn fast_teardown() -> TeardownConfig {
    TeardownConfig::default()
        .workers(2)
        .overrun_warning(Duration::from_millis(50))
        .collect_timeout(WINDOW)
}

/// Build a suite over `directory` using [`fast_teardown`].
pub fn suite(
    directory: ScriptedDirectory,
) -> (Arc<ScriptedDirectory>, FixtureSuite<ScriptedDirectory>) {
    let directory = Arc::new(directory);
    let suite = FixtureSuite::with_config(Arc::clone(&directory), fast_teardown());
    (directory, suite)
}
