//! # Resource Declaration
//!
//! The input record of one reconciliation unit: a local path, the object it
//! mirrors, optional credentials and the desired state.
//!
//! ```yaml
//! path: /srv/app/config.json
//! source: /my-bucket/app/config.json
//! ensure: latest
//! region: eu-west-1
//! access_key_id: AKIA...
//! secret_access_key: ...
//! ```
//!
//! For S3-compatible storage (Ceph, MinIO, Cleversafe) add `endpoint`,
//! `ssl_verify_peer` and `force_path_style`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Desired state of the local file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EnsureState {
    /// Download the object if the file does not exist
    #[default]
    Present,
    /// Remove the file
    Absent,
    /// Keep the file identical to the object, re-downloading on digest mismatch
    Latest,
}

impl EnsureState {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            EnsureState::Present => "present",
            EnsureState::Absent => "absent",
            EnsureState::Latest => "latest",
        }
    }
}

impl fmt::Display for EnsureState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid ensure value '{0}' (expected present, absent or latest)")]
pub struct ParseEnsureStateError(String);

impl FromStr for EnsureState {
    type Err = ParseEnsureStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "present" => Ok(EnsureState::Present),
            "absent" => Ok(EnsureState::Absent),
            "latest" => Ok(EnsureState::Latest),
            _ => Err(ParseEnsureStateError(s.to_string())),
        }
    }
}

/// Credential and endpoint parameters as declared on the resource.
/// Every field is optional; the config resolver decides whether they form a
/// usable client configuration or whether the fallback file is consulted.
#[derive(Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct CredentialParams {
    #[serde(default)]
    pub access_key_id: Option<String>,
    #[serde(default)]
    pub secret_access_key: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    /// Presence switches the client to S3-compatible (non-AWS) mode
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub ssl_verify_peer: Option<bool>,
    #[serde(default)]
    pub force_path_style: Option<bool>,
}

impl fmt::Debug for CredentialParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialParams")
            .field("access_key_id", &self.access_key_id)
            .field(
                "secret_access_key",
                &self.secret_access_key.as_ref().map(|_| "***"),
            )
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .field("ssl_verify_peer", &self.ssl_verify_peer)
            .field("force_path_style", &self.force_path_style)
            .finish()
    }
}

/// One reconciliation unit
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ResourceSpec {
    /// Absolute path of the managed file
    pub path: PathBuf,
    /// Object reference in the form `/bucket/key/with/slashes`
    pub source: String,
    #[serde(flatten)]
    pub credentials: CredentialParams,
    #[serde(default)]
    pub ensure: EnsureState,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DeclarationError {
    #[error("Path not absolute: {}", .0.display())]
    RelativePath(PathBuf),

    #[error("source is required for {}", .0.display())]
    MissingSource(PathBuf),
}

impl ResourceSpec {
    pub fn new(path: impl Into<PathBuf>, source: impl Into<String>, ensure: EnsureState) -> Self {
        Self {
            path: path.into(),
            source: source.into(),
            credentials: CredentialParams::default(),
            ensure,
        }
    }

    #[must_use]
    pub fn with_credentials(mut self, credentials: CredentialParams) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Declaration-time checks, run by the caller before any reconciliation.
    /// The reconciler itself assumes a validated declaration.
    pub fn validate(&self) -> Result<(), DeclarationError> {
        if !self.path.is_absolute() {
            return Err(DeclarationError::RelativePath(self.path.clone()));
        }
        if self.source.trim().is_empty() {
            return Err(DeclarationError::MissingSource(self.path.clone()));
        }
        Ok(())
    }
}
