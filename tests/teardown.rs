//! Tests for suite teardown.
//!
//! They drive `FixtureSuite::clean` over a scripted directory to check
//! success, partial failure, timeouts and retries.

use std::time::Duration;

use fresh_fixtures::{DirectoryConfig, FaultClass, FixtureError, Outcome};
use fresh_fixtures_testing::{Deletion, ScriptedDirectory, scripted_directory};
use rstest::rstest;
use tokio::time::Instant;

mod common;
use common::{NAMES, TestResult, WINDOW, config, suite};

async fn create_each(
    suite: &fresh_fixtures::FixtureSuite<ScriptedDirectory>,
    config: &DirectoryConfig,
) -> TestResult {
    for name in NAMES {
        suite.create(config, &[name.into()]).await?;
    }
    Ok(())
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn empty_registry_cleans_without_work(scripted_directory: ScriptedDirectory) -> TestResult {
    let (directory, suite) = suite(scripted_directory);
    suite.clean().await?;
    assert_eq!(directory.delete_calls(), 0);
    assert_eq!(suite.pool().in_flight(), 0);
    suite.stop().await;
    Ok(())
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn all_success_empties_registry(
    scripted_directory: ScriptedDirectory,
    config: DirectoryConfig,
) -> TestResult {
    let (directory, suite) = suite(scripted_directory);
    create_each(&suite, &config).await?;
    assert_eq!(suite.start().len()?, NAMES.len());

    suite.clean().await?;

    assert!(suite.start().is_empty()?);
    assert_eq!(directory.delete_calls(), NAMES.len());
    assert!(directory.live_identities().is_empty());
    assert_eq!(directory.deleted_identities().len(), NAMES.len());
    suite.stop().await;
    Ok(())
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn partial_failure_keeps_every_batch(config: DirectoryConfig) -> TestResult {
    let (_directory, suite) = suite(
        ScriptedDirectory::new()
            .on_delete("bob", Deletion::Fail("no such user".into()))
            .on_delete("mike", Deletion::Panic("connection reset".into())),
    );
    create_each(&suite, &config).await?;

    let Err(FixtureError::Teardown(failure)) = suite.clean().await else {
        panic!("teardown should fail");
    };

    assert_eq!(failure.count(), 2);
    let mut failed: Vec<_> = failure
        .failures
        .iter()
        .flat_map(|f| f.batch.specs().iter().map(|(name, _)| name.as_str().to_owned()))
        .collect();
    failed.sort();
    assert_eq!(failed, ["bob", "mike"]);
    let ordinals: Vec<_> = failure.failures.iter().map(|f| f.ordinal).collect();
    assert!(ordinals.windows(2).all(|w| w[0] < w[1]), "ordered by ordinal");
    let classes: Vec<_> = failure
        .failures
        .iter()
        .filter_map(|f| match &f.outcome {
            Outcome::Failure(fault) => Some(fault.class),
            _ => None,
        })
        .collect();
    assert!(classes.contains(&FaultClass::Error));
    assert!(classes.contains(&FaultClass::Panic));

    assert_eq!(suite.start().len()?, NAMES.len(), "registry left intact");
    suite.stop().await;
    Ok(())
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn hanging_deletion_times_out_after_last_signal(config: DirectoryConfig) -> TestResult {
    let (_directory, suite) = suite(
        ScriptedDirectory::new()
            .on_delete("bob", Deletion::Delay(Duration::from_millis(80)))
            .on_delete("kate", Deletion::Hang),
    );
    create_each(&suite, &config).await?;

    let started = Instant::now();
    let Err(FixtureError::Teardown(failure)) = suite.clean().await else {
        panic!("kate never completes");
    };
    let elapsed = started.elapsed();

    assert_eq!(failure.count(), 1);
    assert_eq!(failure.timeouts(), 1);
    let identities: Vec<_> = failure.failures[0].batch.identities().collect();
    assert!(identities[0].starts_with("kate"));
    // bob reports at 80ms; the window then runs from that signal.
    assert!(elapsed >= Duration::from_millis(80) + WINDOW, "{elapsed:?}");
    assert!(elapsed < Duration::from_millis(80) + WINDOW * 2, "{elapsed:?}");
    assert_eq!(suite.start().len()?, NAMES.len());
    suite.stop().await;
    Ok(())
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn retry_after_fix_clears_registry(config: DirectoryConfig) -> TestResult {
    let (directory, suite) =
        suite(ScriptedDirectory::new().on_delete("alice", Deletion::Fail("busy".into())));
    create_each(&suite, &config).await?;

    assert!(suite.clean().await.is_err());
    directory.script_delete("alice", Deletion::Succeed);
    suite.clean().await?;

    assert!(suite.start().is_empty()?);
    assert!(directory.live_identities().is_empty());
    assert_eq!(directory.delete_calls(), NAMES.len() * 2);
    suite.stop().await;
    Ok(())
}
