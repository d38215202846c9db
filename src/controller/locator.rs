//! # Object Locator
//!
//! Splits a resource `source` of the form `/bucket/key/with/slashes` into a
//! bucket name and an object key.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocatorError {
    #[error("source '{0}' does not name a bucket")]
    MissingBucket(String),

    #[error("source '{0}' names a bucket but no object key")]
    MissingKey(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ObjectLocation {
    pub bucket: String,
    pub key: String,
}

impl ObjectLocation {
    /// Parse `source`: trailing whitespace is trimmed, one leading `/` is
    /// dropped, the first segment is the bucket and the remaining segments
    /// joined with `/` form the key.
    ///
    /// A trailing `/` is kept as part of the key, so `/bucket/dir/` names the
    /// object `dir/`, not `dir`. S3 treats the two as distinct keys.
    pub fn parse(source: &str) -> Result<Self, LocatorError> {
        let trimmed = source.trim_end();
        let mut segments = trimmed.split('/').peekable();
        if segments.peek().is_some_and(|first| first.is_empty()) {
            segments.next();
        }

        let bucket = match segments.next() {
            Some(bucket) if !bucket.is_empty() => bucket.to_string(),
            _ => return Err(LocatorError::MissingBucket(source.to_string())),
        };

        let key = segments.collect::<Vec<_>>().join("/");
        if key.is_empty() {
            return Err(LocatorError::MissingKey(source.to_string()));
        }

        Ok(Self { bucket, key })
    }
}

impl FromStr for ObjectLocation {
    type Err = LocatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ObjectLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/{}", self.bucket, self.key)
    }
}
