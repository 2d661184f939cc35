//! Renaming fixture specs so every identity is unique to one creation call.

use std::collections::HashSet;

use crate::{
    directory::SpecTable,
    error::{FixtureError, Result},
    fixture::{FixtureName, FixtureRequest, FixtureSpec},
    suffix::Suffix,
};

/// Freshen the specs in `full` whose names appear in `requested`.
///
/// Output order follows `full`, not `requested`. Names without a spec are
/// skipped silently; use [`fresh_specs`] when a missing spec must fail.
///
/// ```
/// use fresh_fixtures::{FixtureName, FixtureSpec, SpecTable, Suffix, freshen};
///
/// let mut table = SpecTable::new();
/// table.insert("alice".into(), FixtureSpec::new().with("username", "alice"));
/// table.insert("bob".into(), FixtureSpec::new().with("username", "bob"));
///
/// let fresh = freshen(&[FixtureName::from("bob")], &table, &Suffix::from("7.000042"));
/// assert_eq!(fresh.len(), 1);
/// assert_eq!(fresh[0].1.identity(), Some("bob7.000042"));
/// ```
#[must_use]
pub fn freshen(
    requested: &[FixtureName],
    full: &SpecTable,
    suffix: &Suffix,
) -> Vec<(FixtureName, FixtureSpec)> {
    let wanted: HashSet<&FixtureName> = requested.iter().collect();
    full.iter()
        .filter(|(name, _)| wanted.contains(name))
        .map(|(name, spec)| (name.clone(), spec.with_identity_suffix(suffix)))
        .collect()
}

/// Freshen every requested fixture, failing unless each request yields
/// exactly one spec.
///
/// # Errors
///
/// Returns [`FixtureError::MissingFixtureSpec`] when the freshened specs
/// do not match the requests one-for-one, naming every request that has no
/// entry in `full` and every name requested more than once.
pub fn fresh_specs(
    requests: &[FixtureRequest],
    full: &SpecTable,
    suffix: &Suffix,
) -> Result<Vec<(FixtureName, FixtureSpec)>> {
    let names: Vec<FixtureName> = requests.iter().map(|request| request.name.clone()).collect();
    let fresh = freshen(&names, full, suffix);
    if fresh.len() == requests.len() {
        return Ok(fresh);
    }

    let mut seen = HashSet::new();
    let mut missing = Vec::new();
    let mut duplicated = Vec::new();
    for name in names {
        if seen.contains(&name) {
            if !duplicated.contains(&name) {
                duplicated.push(name);
            }
        } else {
            seen.insert(name.clone());
            if !full.contains_key(&name) {
                missing.push(name);
            }
        }
    }
    Err(FixtureError::MissingFixtureSpec {
        missing,
        duplicated,
    })
}

/// Freshen a single fixture given by name or `(name, resources)`.
///
/// # Errors
///
/// Returns [`FixtureError::MissingFixtureSpec`] if `full` has no such spec.
pub fn freshen_one(
    request: impl Into<FixtureRequest>,
    full: &SpecTable,
    suffix: &Suffix,
) -> Result<(FixtureName, FixtureSpec)> {
    let request = request.into();
    match full.get(&request.name) {
        Some(spec) => Ok((request.name, spec.with_identity_suffix(suffix))),
        None => Err(FixtureError::MissingFixtureSpec {
            missing: vec![request.name],
            duplicated: Vec::new(),
        }),
    }
}
