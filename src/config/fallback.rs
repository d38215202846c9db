//! # Fallback Configuration
//!
//! Source of the second-chance client configuration, used when the
//! resource's own parameters do not validate.
//!
//! The resolver only sees the [`FallbackSource`] trait. The production
//! implementation, [`FileFallbackSource`], reads `aws_config.yaml` from the
//! host agent's configuration directory:
//!
//! ```yaml
//! :access_key_id: AKIA...
//! :secret_access_key: ...
//! :region: eu-west-1
//! :endpoint: https://ceph.internal
//! :ssl_verify_peer: false
//! :force_path_style: true
//! ```
//!
//! Plain keys (`region:`) and symbol-style keys (`:region:`) are both accepted.

use super::client::{ConfigCandidate, FieldError, FieldProblem};
use super::error::ConfigError;
use serde_yaml::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Flat key/value mapping as loaded from the fallback document
pub type FallbackMap = BTreeMap<String, Value>;

/// A loaded fallback document
#[derive(Clone)]
pub struct FallbackConfig {
    /// Human-readable origin (usually the file path), used in diagnostics
    pub origin: String,
    pub values: FallbackMap,
}

impl fmt::Debug for FallbackConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FallbackConfig")
            .field("origin", &self.origin)
            .field("keys", &self.values.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

/// Provider of the fallback configuration
pub trait FallbackSource: Send + Sync {
    /// Load the fallback mapping.
    /// `Ok(None)` means there is nothing to fall back to (absent or empty).
    fn load(&self) -> Result<Option<FallbackConfig>, ConfigError>;
}

/// No fallback at all; invalid resource parameters are final
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFallback;

impl FallbackSource for NoFallback {
    fn load(&self) -> Result<Option<FallbackConfig>, ConfigError> {
        Ok(None)
    }
}

/// `aws_config.yaml` on disk
#[derive(Debug, Clone)]
pub struct FileFallbackSource {
    path: PathBuf,
}

impl FileFallbackSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FallbackSource for FileFallbackSource {
    fn load(&self) -> Result<Option<FallbackConfig>, ConfigError> {
        let metadata = match std::fs::metadata(&self.path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(
                    "S3 config file {} missing or not readable",
                    self.path.display()
                );
                return Ok(None);
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        if !metadata.is_file() || metadata.len() == 0 {
            debug!("S3 config file {} is empty", self.path.display());
            return Ok(None);
        }

        let content = std::fs::read_to_string(&self.path).map_err(|source| ConfigError::Io {
            path: self.path.clone(),
            source,
        })?;

        let values = parse_fallback_document(&self.path, &content)?;
        Ok(values.map(|values| FallbackConfig {
            origin: self.path.display().to_string(),
            values,
        }))
    }
}

/// Parse a fallback document into a flat mapping.
/// An empty document (`null`) yields `None`.
pub fn parse_fallback_document(path: &Path, content: &str) -> Result<Option<FallbackMap>, ConfigError> {
    let document: Value = serde_yaml::from_str(content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let mapping = match document {
        Value::Null => return Ok(None),
        Value::Mapping(mapping) => mapping,
        _ => {
            return Err(ConfigError::NotAMapping {
                path: path.to_path_buf(),
            })
        }
    };

    let mut values = FallbackMap::new();
    for (key, value) in mapping {
        let Some(key) = key.as_str() else {
            debug!("Ignoring non-string key in {}: {:?}", path.display(), key);
            continue;
        };
        values.insert(key.trim_start_matches(':').to_string(), value);
    }
    Ok(Some(values))
}

impl ConfigCandidate {
    /// Candidate from an untyped fallback mapping. Values of the wrong YAML
    /// type are recorded as field errors rather than coerced.
    #[must_use]
    pub fn from_fallback(values: &FallbackMap) -> Self {
        let mut candidate = ConfigCandidate::default();
        let mut errors = Vec::new();

        candidate.access_key_id = string_field(values, "access_key_id", &mut errors);
        candidate.secret_access_key = string_field(values, "secret_access_key", &mut errors);
        candidate.region = string_field(values, "region", &mut errors);

        let endpoint = string_field(values, "endpoint", &mut errors);
        if endpoint.as_deref().is_some_and(|e| !e.is_empty()) {
            candidate.endpoint = endpoint;
            candidate.ssl_verify_peer = bool_field(values, "ssl_verify_peer", &mut errors);
            candidate.force_path_style = bool_field(values, "force_path_style", &mut errors);
        }

        candidate.type_errors = errors;
        candidate
    }
}

fn string_field(
    values: &FallbackMap,
    field: &'static str,
    errors: &mut Vec<FieldError>,
) -> Option<String> {
    match values.get(field) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => {
            errors.push(FieldError::new(field, FieldProblem::ExpectedString));
            None
        }
    }
}

fn bool_field(
    values: &FallbackMap,
    field: &'static str,
    errors: &mut Vec<FieldError>,
) -> Option<bool> {
    match values.get(field) {
        None | Some(Value::Null) => None,
        Some(Value::Bool(b)) => Some(*b),
        Some(_) => {
            errors.push(FieldError::new(field, FieldProblem::ExpectedBoolean));
            None
        }
    }
}
