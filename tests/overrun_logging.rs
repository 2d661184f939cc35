//! Tests for the overrun warning emitted by slow deletions.
//!
//! Kept in a separate binary so no other test's warnings reach the global
//! log capture.

use std::time::Duration;

use fresh_fixtures_testing::{Deletion, LogCapture, ScriptedDirectory, logs};
use log::Level;
use rstest::rstest;

mod common;
use common::{TestResult, config, suite};

#[rstest]
#[tokio::test(start_paused = true)]
async fn slow_deletion_logs_overrun_but_succeeds(
    mut logs: LogCapture,
    config: fresh_fixtures::DirectoryConfig,
) -> TestResult {
    let (directory, suite) = suite(
        ScriptedDirectory::new().on_delete("alice", Deletion::Delay(Duration::from_millis(90))),
    );
    suite.create(&config, &["alice".into()]).await?;

    suite.clean().await?;

    let warnings = logs.drain_matching(Level::Warn, "teardown unit overran");
    assert_eq!(warnings.len(), 1, "{warnings:?}");
    assert!(directory.live_identities().is_empty());
    suite.stop().await;
    Ok(())
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn fast_deletion_logs_nothing(
    mut logs: LogCapture,
    config: fresh_fixtures::DirectoryConfig,
) -> TestResult {
    let (_directory, suite) = suite(ScriptedDirectory::new());
    suite.create(&config, &["bob".into()]).await?;

    suite.clean().await?;

    assert!(logs.drain_matching(Level::Warn, "teardown unit overran").is_empty());
    suite.stop().await;
    Ok(())
}
