//! Config resolution errors.

use super::client::FieldErrors;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// Resource parameters were invalid and no fallback file was available
    #[error("no valid configuration found")]
    NotFound,

    /// The fallback file was loaded but does not satisfy the schema
    #[error(
        "failed to load S3 config from {origin}: some parameters are missing or not defined ({errors})"
    )]
    Invalid { origin: String, errors: FieldErrors },

    #[error("failed to read S3 config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse S3 config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The fallback document is YAML but not a flat key/value mapping
    #[error("S3 config file {} is not a key/value mapping", path.display())]
    NotAMapping { path: PathBuf },
}
