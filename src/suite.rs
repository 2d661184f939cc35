//! Suite-level lifecycle for fresh fixtures.
//!
//! A [`FixtureSuite`] is what suite setup and teardown code holds on to. It
//! owns the registry lifecycle, the teardown worker pool and the user
//! directory, and exposes `start`, `create`, `clean` and `stop`.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use fresh_fixtures::{DirectoryConfig, FixtureSuite, UserDirectory};
//!
//! # async fn run<D: UserDirectory>(directory: D, config: DirectoryConfig)
//! # -> fresh_fixtures::Result<()> {
//! let suite = FixtureSuite::new(Arc::new(directory));
//! suite.start();
//!
//! let fresh = suite.create(&config, &["alice".into(), ("bob", 2).into()]).await?;
//! // ... run the test body against `fresh` ...
//! # let _ = fresh;
//!
//! suite.clean().await?;
//! suite.stop().await;
//! # Ok(())
//! # }
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::{
    config::TeardownConfig,
    directory::{DirectoryConfig, SpecTable, UserDirectory},
    error::Result,
    fixture::{FixtureBatch, FixtureRequest, FixtureSpec},
    freshen::fresh_specs,
    registry::FixtureRegistry,
    suffix::Suffix,
    teardown::{self, WorkerPool},
};

/// Creates fresh fixtures and tears them all down at the end of a suite.
#[derive(Debug)]
pub struct FixtureSuite<D: ?Sized> {
    directory: Arc<D>,
    config: TeardownConfig,
    pool: WorkerPool,
    registry: Mutex<Option<FixtureRegistry>>,
}

impl<D> FixtureSuite<D>
where
    D: UserDirectory + ?Sized,
{
    /// Create a suite with the default [`TeardownConfig`].
    #[must_use]
    pub fn new(directory: Arc<D>) -> Self {
        Self::with_config(directory, TeardownConfig::default())
    }

    /// Create a suite with explicit teardown settings.
    ///
    /// Settings are normalised; see [`TeardownConfig::normalized`].
    #[must_use]
    pub fn with_config(directory: Arc<D>, config: TeardownConfig) -> Self {
        let config = config.normalized();
        Self {
            directory,
            pool: WorkerPool::new(&config),
            config,
            registry: Mutex::new(None),
        }
    }

    /// Effective teardown settings.
    #[must_use]
    pub fn config(&self) -> &TeardownConfig { &self.config }

    /// Worker pool shared by every teardown pass.
    #[must_use]
    pub fn pool(&self) -> &WorkerPool { &self.pool }

    fn slot(&self) -> MutexGuard<'_, Option<FixtureRegistry>> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start the registry if it is not already running.
    ///
    /// Must be called from within a Tokio runtime. Calling it again returns a
    /// handle to the same registry.
    pub fn start(&self) -> FixtureRegistry {
        self.slot()
            .get_or_insert_with(FixtureRegistry::start)
            .clone()
    }

    /// Stop the registry, releasing every recorded batch.
    ///
    /// Deletion units still running from a timed-out pass are not waited
    /// for. Stopping a suite that was never started does nothing.
    pub async fn stop(&self) {
        let registry = self.slot().take();
        if let Some(registry) = registry {
            registry.stop().await;
            tracing::debug!("fixture suite stopped");
        }
    }

    /// Freshen the requested specs, create them and record the batch.
    ///
    /// The spec table is read from `config`. The returned configuration holds
    /// only the freshened specs under the spec table key, merged with
    /// whatever the directory added, and should be passed on to the test
    /// body in place of `config`.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::MissingFixtureSpec`] if a request has no
    /// spec, or [`FixtureError::Directory`] if creation fails. Nothing is
    /// recorded in either case.
    ///
    /// [`FixtureError::MissingFixtureSpec`]: crate::FixtureError::MissingFixtureSpec
    /// [`FixtureError::Directory`]: crate::FixtureError::Directory
    pub async fn create(
        &self,
        config: &DirectoryConfig,
        requests: &[FixtureRequest],
    ) -> Result<DirectoryConfig> {
        let registry = self.start();
        let suffix = unused_suffix(&registry, Suffix::generate).await?;
        let empty = SpecTable::new();
        let table = config.fixture_specs().unwrap_or(&empty);
        let fresh = fresh_specs(requests, table, &suffix)?;

        let fresh_config = config
            .clone()
            .with_fixture_specs(fresh.iter().cloned().collect());
        let created = self
            .directory
            .create_fixtures(&fresh_config, &fresh)
            .await?;
        let created = fresh_config.merge(created);

        let fixtures = fresh.len();
        registry.record(suffix.clone(), FixtureBatch::new(created.clone(), fresh))?;
        crate::metrics::inc_batches_created();
        tracing::info!(%suffix, fixtures, "fresh fixtures created");
        Ok(created)
    }

    /// Create a single fresh fixture and return its freshened spec alongside
    /// the enriched configuration.
    ///
    /// # Errors
    ///
    /// As for [`create`](Self::create).
    pub async fn create_one(
        &self,
        config: &DirectoryConfig,
        request: impl Into<FixtureRequest>,
    ) -> Result<(DirectoryConfig, FixtureSpec)> {
        let request = request.into();
        let created = self.create(config, std::slice::from_ref(&request)).await?;
        let spec = created
            .fixture_specs()
            .and_then(|specs| specs.get(&request.name))
            .cloned()
            .unwrap_or_default();
        Ok((created, spec))
    }

    /// Delete every recorded batch.
    ///
    /// On success the registry is empty. On failure it is left untouched and
    /// the error lists every batch that failed or timed out; calling `clean`
    /// again retries all recorded batches.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::Teardown`] if any batch could not be deleted.
    ///
    /// [`FixtureError::Teardown`]: crate::FixtureError::Teardown
    pub async fn clean(&self) -> Result<()> {
        let registry = self.start();
        teardown::clean(
            &registry,
            &self.pool,
            &self.directory,
            self.config.collect_timeout,
        )
        .await
    }
}

/// Draw suffixes from `generate` until one is not yet recorded in `registry`.
///
/// Only sequential callers are protected; two creations racing inside the
/// same microsecond can still collide, which `record` reports.
async fn unused_suffix<G>(registry: &FixtureRegistry, mut generate: G) -> Result<Suffix>
where
    G: FnMut() -> Suffix,
{
    loop {
        let suffix = generate();
        if !registry.contains(&suffix)? {
            return Ok(suffix);
        }
        tokio::task::yield_now().await;
    }
}
