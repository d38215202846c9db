//! # Reconciler
//!
//! Drives one managed file towards its declared ensure state.
//!
//! ## Reconciliation Flow
//!
//! 1. `present`: nothing to do when the file exists, otherwise download it
//! 2. `absent`: remove the file when it exists
//! 3. `latest`: download when missing; otherwise compare the local MD5 with
//!    the remote ETag and download only when they differ
//!
//! Every failure aborts the run immediately. There are no retries, and a
//! failed metadata lookup or download leaves the existing file untouched.

use crate::config::ConfigResolver;
use crate::controller::digest;
use crate::controller::locator::ObjectLocation;
use crate::error::{Error, Result};
use crate::observability::metrics;
use crate::provider::{ObjectStore, StoreConnector};
use crate::resource::{EnsureState, ResourceSpec};
use serde::Serialize;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, info_span, warn, Instrument};

/// What a reconciliation did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Created { bytes: u64 },
    Updated { bytes: u64 },
    Unchanged,
    Removed,
    AlreadyAbsent,
    AlreadyPresent,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Created { .. } => "created",
            Outcome::Updated { .. } => "updated",
            Outcome::Unchanged => "unchanged",
            Outcome::Removed => "removed",
            Outcome::AlreadyAbsent => "already_absent",
            Outcome::AlreadyPresent => "already_present",
        }
    }

    /// Whether the run modified the local filesystem
    #[must_use]
    pub fn changed(&self) -> bool {
        matches!(
            self,
            Outcome::Created { .. } | Outcome::Updated { .. } | Outcome::Removed
        )
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Created { bytes } => write!(f, "created ({bytes} bytes)"),
            Outcome::Updated { bytes } => write!(f, "updated ({bytes} bytes)"),
            other => f.write_str(other.as_str()),
        }
    }
}

/// Reconciles [`ResourceSpec`]s against an object store.
///
/// Holds no per-file state, so one instance can serve concurrent
/// reconciliations of different paths.
pub struct Reconciler {
    resolver: ConfigResolver,
    connector: Arc<dyn StoreConnector>,
}

impl fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reconciler")
            .field("resolver", &self.resolver)
            .finish_non_exhaustive()
    }
}

impl Reconciler {
    pub fn new(resolver: ConfigResolver, connector: Arc<dyn StoreConnector>) -> Self {
        Self {
            resolver,
            connector,
        }
    }

    /// Whether the managed file is present locally
    pub fn exists(&self, spec: &ResourceSpec) -> bool {
        spec.path().exists()
    }

    /// Download the object to the managed path, whatever is there now
    pub async fn create(&self, spec: &ResourceSpec) -> Result<Outcome> {
        let (store, location) = self.connect(spec).await?;
        let bytes = fetch(store.as_ref(), &location, spec.path()).await?;
        Ok(Outcome::Created { bytes })
    }

    /// Remove the managed file. Needs neither configuration nor the network.
    pub async fn destroy(&self, spec: &ResourceSpec) -> Result<Outcome> {
        match tokio::fs::remove_file(spec.path()).await {
            Ok(()) => {
                debug!("Removed {}", spec.path().display());
                Ok(Outcome::Removed)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Outcome::AlreadyAbsent),
            Err(e) => Err(Error::io(spec.path(), e)),
        }
    }

    /// Bring an existing file in line with the remote object, downloading
    /// only when the local MD5 differs from the remote ETag
    pub async fn update(&self, spec: &ResourceSpec) -> Result<Outcome> {
        if !self.exists(spec) {
            debug!(
                "{} does not exist, downloading {}",
                spec.path().display(),
                spec.source
            );
            return self.create(spec).await;
        }

        let (store, location) = self.connect(spec).await?;
        let head = store.head(&location).await.map_err(|e| {
            if e.is_not_found() {
                warn!(
                    "Object {} does not exist, leaving {} untouched",
                    location,
                    spec.path().display()
                );
            }
            e
        })?;

        debug!(
            "Comparing MD5 values for file: {} (remote size {})",
            location.key,
            head.content_length
                .map_or_else(|| "unknown".to_string(), |n| n.to_string())
        );
        let comparison = digest::compare(spec.path(), &head.etag).await?;
        metrics::record_digest_check(comparison.matches());

        if comparison.matches() {
            debug!("File {} already up-to-date", location.key);
            return Ok(Outcome::Unchanged);
        }

        debug!(
            "Update file from {} to {}",
            comparison.local, comparison.remote
        );
        let bytes = fetch(store.as_ref(), &location, spec.path()).await?;
        Ok(Outcome::Updated { bytes })
    }

    /// Run the lifecycle operation the declared ensure state calls for
    pub async fn ensure(&self, spec: &ResourceSpec) -> Result<Outcome> {
        let span = info_span!(
            "file.reconcile",
            path = %spec.path().display(),
            source = %spec.source,
            ensure = %spec.ensure
        );
        let start = Instant::now();

        let result = async {
            match spec.ensure {
                EnsureState::Present if self.exists(spec) => Ok(Outcome::AlreadyPresent),
                EnsureState::Present => self.create(spec).await,
                EnsureState::Absent if self.exists(spec) => self.destroy(spec).await,
                EnsureState::Absent => Ok(Outcome::AlreadyAbsent),
                EnsureState::Latest => self.update(spec).await,
            }
        }
        .instrument(span.clone())
        .await;

        span.in_scope(|| match &result {
            Ok(outcome) => {
                metrics::record_reconciliation(
                    spec.ensure.as_str(),
                    outcome.as_str(),
                    start.elapsed().as_secs_f64(),
                );
                if outcome.changed() {
                    info!("{}: {}", spec.path().display(), outcome);
                } else {
                    debug!("{}: {}", spec.path().display(), outcome);
                }
            }
            Err(e) => {
                metrics::increment_reconciliation_errors(e.kind());
                error!("Reconciliation of {} failed: {}", spec.path().display(), e);
            }
        });
        result
    }

    /// Resolve the client configuration, locate the object and open a client.
    /// The configuration is checked before the source so a missing config is
    /// reported even for a malformed source.
    async fn connect(
        &self,
        spec: &ResourceSpec,
    ) -> Result<(Box<dyn ObjectStore>, ObjectLocation)> {
        let config = self.resolver.resolve(&spec.credentials)?;
        let location = ObjectLocation::parse(&spec.source)?;
        let store = self.connector.connect(&config).await?;
        Ok((store, location))
    }
}

async fn fetch(
    store: &dyn ObjectStore,
    location: &ObjectLocation,
    destination: &Path,
) -> Result<u64> {
    let bytes = store.get(location, destination).await?;
    metrics::record_fetch(bytes);
    Ok(bytes)
}
