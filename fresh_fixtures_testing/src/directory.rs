//! Scriptable in-memory [`UserDirectory`] for exercising suites in tests.
//!
//! Behaviour is keyed on fixture *names* (e.g. `bob`), since identities are
//! suffixed afresh on every creation call.

use std::{
    sync::atomic::{AtomicUsize, Ordering},
    time::Duration,
};

use async_trait::async_trait;
use dashmap::{DashMap, DashSet};
use fresh_fixtures::{
    ConfigValue,
    DirectoryConfig,
    DirectoryError,
    FixtureName,
    FixtureSpec,
    UserDirectory,
};
use rstest::fixture;

/// Configuration key the scripted directory adds on creation.
pub const CREATED_KEY: &str = "scripted_fixtures_created";

/// How deleting a batch containing a scripted fixture behaves.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Deletion {
    /// Delete successfully (the default).
    Succeed,
    /// Return a [`DirectoryError`] with this reason.
    Fail(String),
    /// Panic with this message.
    Panic(String),
    /// Never complete.
    Hang,
    /// Succeed after sleeping.
    Delay(Duration),
}

/// In-memory directory that records what it created and deleted.
#[derive(Debug, Default)]
pub struct ScriptedDirectory {
    deletions: DashMap<FixtureName, Deletion>,
    refuse_create: DashSet<FixtureName>,
    live: DashSet<String>,
    deleted: DashSet<String>,
    delete_calls: AtomicUsize,
}

impl ScriptedDirectory {
    /// Create a directory where every operation succeeds.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Script how batches containing `name` are deleted.
    #[must_use]
    pub fn on_delete(self, name: &str, deletion: Deletion) -> Self {
        self.script_delete(name, deletion);
        self
    }

    /// Change the deletion script for `name` after construction.
    pub fn script_delete(&self, name: &str, deletion: Deletion) {
        self.deletions.insert(FixtureName::from(name), deletion);
    }

    /// Refuse to create any batch containing `name`.
    #[must_use]
    pub fn refuse_create(self, name: &str) -> Self {
        self.refuse_create.insert(FixtureName::from(name));
        self
    }

    /// Identities created and not yet deleted.
    #[must_use]
    pub fn live_identities(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.live.iter().map(|id| id.key().clone()).collect();
        ids.sort();
        ids
    }

    /// Identities deleted so far.
    #[must_use]
    pub fn deleted_identities(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.deleted.iter().map(|id| id.key().clone()).collect();
        ids.sort();
        ids
    }

    /// Number of `delete_fixtures` calls received.
    #[must_use]
    pub fn delete_calls(&self) -> usize { self.delete_calls.load(Ordering::SeqCst) }

    fn deletion_for(&self, specs: &[(FixtureName, FixtureSpec)]) -> Deletion {
        specs
            .iter()
            .find_map(|(name, _)| self.deletions.get(name).map(|d| d.value().clone()))
            .unwrap_or(Deletion::Succeed)
    }
}

fn identities(specs: &[(FixtureName, FixtureSpec)]) -> impl Iterator<Item = String> + '_ {
    specs
        .iter()
        .filter_map(|(_, spec)| spec.identity().map(str::to_owned))
}

#[async_trait]
impl UserDirectory for ScriptedDirectory {
    async fn create_fixtures(
        &self,
        _config: &DirectoryConfig,
        specs: &[(FixtureName, FixtureSpec)],
    ) -> Result<DirectoryConfig, DirectoryError> {
        if let Some((name, _)) = specs
            .iter()
            .find(|(name, _)| self.refuse_create.contains(name))
        {
            return Err(DirectoryError::create(format!("refusing to create {name}")));
        }
        for identity in identities(specs) {
            self.live.insert(identity);
        }
        let count = i64::try_from(specs.len()).unwrap_or(i64::MAX);
        Ok(DirectoryConfig::new().with(CREATED_KEY, ConfigValue::Integer(count)))
    }

    async fn delete_fixtures(
        &self,
        _config: &DirectoryConfig,
        specs: &[(FixtureName, FixtureSpec)],
    ) -> Result<(), DirectoryError> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        match self.deletion_for(specs) {
            Deletion::Succeed => {}
            Deletion::Fail(reason) => return Err(DirectoryError::delete(reason)),
            Deletion::Panic(message) => panic!("{message}"),
            Deletion::Hang => std::future::pending::<()>().await,
            Deletion::Delay(delay) => tokio::time::sleep(delay).await,
        }
        for identity in identities(specs) {
            self.live.remove(&identity);
            self.deleted.insert(identity);
        }
        Ok(())
    }
}

/// Fixture providing a directory where every operation succeeds.
#[allow(
    unused_braces,
    reason = "rustc false positive for single line rstest fixtures"
)]
#[fixture]
pub fn scripted_directory() -> ScriptedDirectory { ScriptedDirectory::new() }
