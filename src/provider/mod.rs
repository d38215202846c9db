//! # Provider Modules
//!
//! Object store capability used by the reconciler.
//!
//! The reconciler needs exactly two operations: a metadata lookup (`head`)
//! returning the entity tag, and a content fetch (`get`) that materializes the
//! object at a local path. Any transport or service failure surfaces as a
//! [`StoreError`] carrying a code and message.

use crate::config::ClientConfig;
use crate::controller::locator::ObjectLocation;
use crate::error::Result;
use async_trait::async_trait;
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Object metadata returned by `head`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectHead {
    /// Entity tag as reported by the store, quotes included
    pub etag: String,
    /// Informational only, never part of the sync decision
    pub content_length: Option<i64>,
}

/// Failure reported by the object store or its transport.
/// Authentication, not-found, permission, throttling and network failures are
/// all represented the same way.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code}: {message}")]
pub struct StoreError {
    code: String,
    message: String,
}

impl StoreError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Object or bucket does not exist
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self.code.as_str(), "NotFound" | "NoSuchKey" | "NoSuchBucket")
    }
}

/// Object store provider trait
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Retrieve object metadata without the object itself
    async fn head(&self, location: &ObjectLocation) -> Result<ObjectHead, StoreError>;

    /// Download the object to `destination`, replacing any existing file
    /// atomically. Returns the number of bytes written.
    async fn get(&self, location: &ObjectLocation, destination: &Path) -> Result<u64>;
}

/// Builds an [`ObjectStore`] client from a resolved configuration.
/// Called once per reconciliation.
#[async_trait]
pub trait StoreConnector: Send + Sync {
    async fn connect(&self, config: &ClientConfig) -> Result<Box<dyn ObjectStore>, StoreError>;
}

impl fmt::Debug for dyn ObjectStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ObjectStore")
    }
}

pub mod s3;
