//! Contract with the external user directory and the configuration it reads.
//!
//! The directory is whatever creates and deletes accounts on the server
//! under test. This crate never talks to a server itself; suites plug in an
//! implementation of [`UserDirectory`].

use async_trait::async_trait;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::fixture::{FixtureName, FixtureSpec};

/// Configuration key holding the full fixture spec table.
pub const FIXTURE_SPECS_KEY: &str = "fixture_users";

/// Table of every fixture spec a suite knows about, in declaration order.
pub type SpecTable = IndexMap<FixtureName, FixtureSpec>;

/// Value stored under a configuration key.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    /// Plain text setting.
    Text(String),
    /// Integer setting.
    Integer(i64),
    /// Fixture spec table.
    Specs(SpecTable),
}

/// Ordered key/value configuration shared with the user directory.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DirectoryConfig(IndexMap<String, ConfigValue>);

impl DirectoryConfig {
    /// Create an empty configuration.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Builder-style insertion of an arbitrary setting.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: ConfigValue) -> Self {
        self.set(key, value);
        self
    }

    /// Builder-style replacement of the fixture spec table.
    #[must_use]
    pub fn with_fixture_specs(self, specs: SpecTable) -> Self {
        self.with(FIXTURE_SPECS_KEY, ConfigValue::Specs(specs))
    }

    /// Insert or replace a setting, keeping the original position on replace.
    pub fn set(&mut self, key: impl Into<String>, value: ConfigValue) {
        self.0.insert(key.into(), value);
    }

    /// Look up a setting.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ConfigValue> { self.0.get(key) }

    /// Full fixture spec table, if configured.
    #[must_use]
    pub fn fixture_specs(&self) -> Option<&SpecTable> {
        match self.0.get(FIXTURE_SPECS_KEY) {
            Some(ConfigValue::Specs(specs)) => Some(specs),
            _ => None,
        }
    }

    /// Merge `other` into `self`; keys present in both take `other`'s value.
    #[must_use]
    pub fn merge(mut self, other: DirectoryConfig) -> Self {
        self.0.extend(other.0);
        self
    }
}

/// Failure reported by a [`UserDirectory`] implementation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{operation} failed: {reason}")]
pub struct DirectoryError {
    /// Operation that failed, e.g. `create` or `delete`.
    pub operation: &'static str,
    /// Human-readable cause.
    pub reason: String,
}

impl DirectoryError {
    /// Failure while creating fixtures.
    #[must_use]
    pub fn create(reason: impl Into<String>) -> Self {
        Self {
            operation: "create",
            reason: reason.into(),
        }
    }

    /// Failure while deleting fixtures.
    #[must_use]
    pub fn delete(reason: impl Into<String>) -> Self {
        Self {
            operation: "delete",
            reason: reason.into(),
        }
    }
}

/// Creates and deletes fixtures on the system under test.
///
/// Implementations must be shareable across the teardown worker pool.
#[async_trait]
pub trait UserDirectory: Send + Sync + 'static {
    /// Create every fixture in `specs`, returning `config` enriched with
    /// whatever the directory needs later to delete them.
    async fn create_fixtures(
        &self,
        config: &DirectoryConfig,
        specs: &[(FixtureName, FixtureSpec)],
    ) -> Result<DirectoryConfig, DirectoryError>;

    /// Delete fixtures previously created with [`create_fixtures`].
    ///
    /// [`create_fixtures`]: UserDirectory::create_fixtures
    async fn delete_fixtures(
        &self,
        config: &DirectoryConfig,
        specs: &[(FixtureName, FixtureSpec)],
    ) -> Result<(), DirectoryError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_prefers_incoming_values() {
        let base = DirectoryConfig::new()
            .with("host", ConfigValue::Text("localhost".into()))
            .with("port", ConfigValue::Integer(5222));
        let merged = base.merge(DirectoryConfig::new().with("port", ConfigValue::Integer(5223)));
        assert_eq!(merged.get("port"), Some(&ConfigValue::Integer(5223)));
        assert_eq!(merged.get("host"), Some(&ConfigValue::Text("localhost".into())));
    }

    #[test]
    fn fixture_specs_read_from_well_known_key() {
        let mut table = SpecTable::new();
        table.insert("alice".into(), FixtureSpec::new().with("username", "alice"));
        let config = DirectoryConfig::new().with_fixture_specs(table.clone());
        assert_eq!(config.fixture_specs(), Some(&table));
        assert!(DirectoryConfig::new().fixture_specs().is_none());
    }

    #[test]
    fn config_parses_from_json() {
        let config: DirectoryConfig = serde_json::from_str(
            r#"{"host":"localhost","fixture_users":{"alice":{"username":"alice","port":5222}}}"#,
        )
        .expect("valid config json");
        let specs = config.fixture_specs().expect("spec table present");
        assert_eq!(specs.len(), 1);
        assert_eq!(
            specs.get(&FixtureName::from("alice")).and_then(FixtureSpec::identity),
            Some("alice")
        );
    }
}
