//! Fixture specs, requests and the batches recorded after creation.

use std::{fmt, sync::Arc};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{directory::DirectoryConfig, suffix::Suffix};

/// Attribute holding a fixture's identity; the freshener rewrites it.
pub const IDENTITY_KEY: &str = "username";

/// Symbolic name of a fixture spec, e.g. `alice`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FixtureName(String);

impl FixtureName {
    /// Create a name from anything string-like.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self { Self(name.into()) }

    /// Borrow the name text.
    #[must_use]
    pub fn as_str(&self) -> &str { &self.0 }
}

impl From<&str> for FixtureName {
    fn from(value: &str) -> Self { Self::new(value) }
}

impl From<String> for FixtureName {
    fn from(value: String) -> Self { Self(value) }
}

impl fmt::Display for FixtureName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

/// Value of a single spec attribute.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    /// Free-form text such as an identity, password or host.
    Text(String),
    /// Integer setting such as a port or resource count.
    Integer(i64),
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self { Self::Text(value.to_owned()) }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self { Self::Text(value) }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self { Self::Integer(value) }
}

/// Ordered attributes describing one fixture to be created.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FixtureSpec(IndexMap<String, AttributeValue>);

impl FixtureSpec {
    /// Create an empty spec.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Builder-style attribute insertion, preserving insertion order.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Look up an attribute.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&AttributeValue> { self.0.get(key) }

    /// Return the textual identity attribute, if present.
    #[must_use]
    pub fn identity(&self) -> Option<&str> {
        match self.0.get(IDENTITY_KEY) {
            Some(AttributeValue::Text(identity)) => Some(identity.as_str()),
            _ => None,
        }
    }

    /// Copy of this spec with `suffix` appended to the identity.
    ///
    /// Specs without a textual identity are returned unchanged. The attribute
    /// keeps its position in the ordering.
    #[must_use]
    pub fn with_identity_suffix(&self, suffix: &Suffix) -> Self {
        let mut fresh = self.clone();
        if let Some(AttributeValue::Text(identity)) = fresh.0.get_mut(IDENTITY_KEY) {
            identity.push_str(suffix.as_str());
        }
        fresh
    }

    /// Iterate over attributes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K, V> FromIterator<(K, V)> for FixtureSpec
where
    K: Into<String>,
    V: Into<AttributeValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Fixture to create: a bare name or a name with a resource count.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FixtureRequest {
    /// Spec to look up.
    pub name: FixtureName,
    /// Number of sessions the caller intends to open for this fixture.
    pub resources: u32,
}

impl FixtureRequest {
    /// Resource count used when a request names only the fixture.
    pub const DEFAULT_RESOURCES: u32 = 1;
}

impl From<&str> for FixtureRequest {
    fn from(name: &str) -> Self { FixtureName::from(name).into() }
}

impl From<FixtureName> for FixtureRequest {
    fn from(name: FixtureName) -> Self {
        Self {
            name,
            resources: Self::DEFAULT_RESOURCES,
        }
    }
}

impl From<(&str, u32)> for FixtureRequest {
    fn from((name, resources): (&str, u32)) -> Self {
        Self {
            name: name.into(),
            resources,
        }
    }
}

impl From<(FixtureName, u32)> for FixtureRequest {
    fn from((name, resources): (FixtureName, u32)) -> Self { Self { name, resources } }
}

/// What was created under one suffix and how to delete it.
///
/// Cloning is cheap; the snapshot itself is shared and never mutated.
#[derive(Clone, Debug, PartialEq)]
pub struct FixtureBatch(Arc<BatchInner>);

#[derive(Debug, PartialEq)]
struct BatchInner {
    config: DirectoryConfig,
    specs: Vec<(FixtureName, FixtureSpec)>,
}

impl FixtureBatch {
    /// Capture the configuration returned by creation and the specs it used.
    #[must_use]
    pub fn new(config: DirectoryConfig, specs: Vec<(FixtureName, FixtureSpec)>) -> Self {
        Self(Arc::new(BatchInner { config, specs }))
    }

    /// Configuration state after the fixtures were created.
    #[must_use]
    pub fn config(&self) -> &DirectoryConfig { &self.0.config }

    /// Freshened specs that were created.
    #[must_use]
    pub fn specs(&self) -> &[(FixtureName, FixtureSpec)] { &self.0.specs }

    /// Identities of every fixture in the batch.
    pub fn identities(&self) -> impl Iterator<Item = &str> {
        self.0.specs.iter().filter_map(|(_, spec)| spec.identity())
    }
}
