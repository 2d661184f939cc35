//! Tests for creating fresh fixtures through a `FixtureSuite`.
//!
//! They check identity rewriting, registry bookkeeping and the failure paths
//! that must leave the registry untouched.

use fresh_fixtures::{
    ConfigValue,
    DirectoryConfig,
    FixtureError,
    FixtureName,
    FixtureRequest,
    IDENTITY_KEY,
    RegistryError,
};
use fresh_fixtures_testing::{CREATED_KEY, ScriptedDirectory, scripted_directory};
use rstest::rstest;

mod common;
use common::{TestResult, config, suite};

fn identity_of(config: &DirectoryConfig, name: &str) -> Option<String> {
    config
        .fixture_specs()?
        .get(&FixtureName::from(name))?
        .identity()
        .map(str::to_owned)
}

#[rstest]
#[tokio::test]
async fn create_freshens_records_and_enriches(
    scripted_directory: ScriptedDirectory,
    config: DirectoryConfig,
) -> TestResult {
    let (directory, suite) = suite(scripted_directory);
    let requests = [FixtureRequest::from("alice"), FixtureRequest::from(("bob", 2))];

    let fresh = suite.create(&config, &requests).await?;

    let specs = fresh.fixture_specs().ok_or("fresh config lacks specs")?;
    assert_eq!(specs.len(), 2);
    let alice = identity_of(&fresh, "alice").ok_or("alice missing")?;
    let bob = identity_of(&fresh, "bob").ok_or("bob missing")?;
    let alice_suffix = alice.strip_prefix("alice").ok_or("alice not prefixed")?;
    let bob_suffix = bob.strip_prefix("bob").ok_or("bob not prefixed")?;
    assert!(!alice_suffix.is_empty());
    assert_eq!(alice_suffix, bob_suffix, "one suffix per creation call");

    assert_eq!(fresh.get("host"), Some(&ConfigValue::Text("localhost".into())));
    assert_eq!(fresh.get(CREATED_KEY), Some(&ConfigValue::Integer(2)));
    assert_eq!(directory.live_identities(), [alice.clone(), bob]);

    let entries = suite.start().list()?;
    assert_eq!(entries.len(), 1);
    let (suffix, batch) = &entries[0];
    assert_eq!(suffix.as_str(), alice_suffix);
    assert!(batch.identities().any(|id| id == alice));
    suite.stop().await;
    Ok(())
}

#[rstest]
#[tokio::test]
async fn missing_spec_fails_before_creating(
    scripted_directory: ScriptedDirectory,
    config: DirectoryConfig,
) -> TestResult {
    let (directory, suite) = suite(scripted_directory);

    let err = suite
        .create(&config, &["alice".into(), "zed".into()])
        .await
        .expect_err("zed has no spec");

    assert!(matches!(
        &err,
        FixtureError::MissingFixtureSpec { missing, .. } if missing == &[FixtureName::from("zed")]
    ));
    assert!(err.to_string().starts_with("failed to get required users"));
    assert!(directory.live_identities().is_empty());
    assert!(suite.start().is_empty()?);
    suite.stop().await;
    Ok(())
}

#[rstest]
#[tokio::test]
async fn missing_spec_table_reports_every_request(scripted_directory: ScriptedDirectory) {
    let (_directory, suite) = suite(scripted_directory);
    let err = suite
        .create(&DirectoryConfig::new(), &["alice".into(), "bob".into()])
        .await
        .expect_err("no spec table configured");
    assert!(matches!(err, FixtureError::MissingFixtureSpec { missing, .. } if missing.len() == 2));
    suite.stop().await;
}

#[rstest]
#[tokio::test]
async fn repeated_request_fails_before_creating(
    scripted_directory: ScriptedDirectory,
    config: DirectoryConfig,
) -> TestResult {
    let (directory, suite) = suite(scripted_directory);

    let err = suite
        .create(&config, &["alice".into(), "alice".into()])
        .await
        .expect_err("alice is requested twice");

    assert!(matches!(
        &err,
        FixtureError::MissingFixtureSpec { missing, duplicated }
            if missing.is_empty() && duplicated == &[FixtureName::from("alice")]
    ));
    assert!(directory.live_identities().is_empty());
    assert!(suite.start().is_empty()?);
    suite.stop().await;
    Ok(())
}

#[rstest]
#[tokio::test]
async fn refused_creation_is_not_recorded(config: DirectoryConfig) -> TestResult {
    let (_directory, suite) = suite(ScriptedDirectory::new().refuse_create("kate"));

    let err = suite
        .create(&config, &["alice".into(), "kate".into()])
        .await
        .expect_err("directory refuses kate");

    assert!(matches!(err, FixtureError::Directory(_)));
    assert!(suite.start().is_empty()?);
    suite.stop().await;
    Ok(())
}

#[rstest]
#[tokio::test]
async fn create_one_returns_fresh_spec(
    scripted_directory: ScriptedDirectory,
    config: DirectoryConfig,
) -> TestResult {
    let (_directory, suite) = suite(scripted_directory);

    let (fresh, spec) = suite.create_one(&config, ("mike", 3)).await?;

    let identity = spec.identity().ok_or("mike has no identity")?;
    assert!(identity.starts_with("mike") && identity.len() > "mike".len());
    assert_eq!(identity_of(&fresh, "mike").as_deref(), Some(identity));
    assert!(spec.get(IDENTITY_KEY).is_some());
    assert_eq!(suite.start().len()?, 1);
    suite.stop().await;
    Ok(())
}

#[rstest]
#[tokio::test]
async fn start_is_idempotent_and_stop_releases(
    scripted_directory: ScriptedDirectory,
    config: DirectoryConfig,
) -> TestResult {
    let (_directory, suite) = suite(scripted_directory);
    let first = suite.start();
    suite.create(&config, &["alice".into()]).await?;
    let second = suite.start();
    assert_eq!(second.len()?, 1, "second start sees the same table");

    suite.stop().await;
    assert_eq!(first.list(), Err(RegistryError::Stopped));

    let restarted = suite.start();
    assert!(restarted.is_empty()?, "a new lifecycle starts empty");
    suite.stop().await;
    Ok(())
}

#[rstest]
#[tokio::test]
async fn stop_without_start_is_a_no_op(scripted_directory: ScriptedDirectory) {
    let (_directory, suite) = suite(scripted_directory);
    suite.stop().await;
}
