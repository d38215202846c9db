//! # Errors
//!
//! Error taxonomy for a reconciliation pass.
//!
//! Every variant is fatal to the current pass. Nothing here is retried or
//! downgraded to a warning: the hosting agent re-runs the whole pass on its
//! next schedule.

use crate::config::ConfigError;
use crate::controller::locator::LocatorError;
use crate::provider::StoreError;
use crate::resource::DeclarationError;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Locator(#[from] LocatorError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Declaration(#[from] DeclarationError),

    /// Local filesystem failure (digest, write, rename, remove)
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Short code reported alongside the message (`<code>: <message>`).
    /// Store errors carry the upstream service code unmodified.
    #[must_use]
    pub fn code(&self) -> &str {
        match self {
            Error::Config(_) => "ConfigError",
            Error::Locator(_) => "LocatorError",
            Error::Store(e) => e.code(),
            Error::Declaration(_) => "DeclarationError",
            Error::Io { .. } => "IoError",
        }
    }

    /// Metric label for the error class
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Config(_) => "config",
            Error::Locator(_) => "locator",
            Error::Store(_) => "store",
            Error::Declaration(_) => "declaration",
            Error::Io { .. } => "io",
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
