//! # Digest Comparison
//!
//! Decides whether a local file already matches a remote object by comparing
//! the file's MD5 digest with the object's ETag. Nothing else (size, mtime,
//! version id) takes part in the decision.
//!
//! Known accuracy boundary: objects uploaded in multiple parts carry a
//! composite ETag (`<hex>-<parts>`) that never equals a plain MD5, so such
//! objects are downloaded again on every `latest` pass.

use crate::constants::DIGEST_CHUNK_SIZE;
use crate::error::{Error, Result};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

/// MD5 of the file's full contents, lowercase hex.
/// Hashing runs on the blocking pool.
pub async fn file_md5(path: &Path) -> Result<String> {
    let owned: PathBuf = path.to_path_buf();
    tokio::task::spawn_blocking(move || compute_md5_sync(&owned))
        .await
        .map_err(|e| Error::io(path, std::io::Error::other(e)))?
        .map_err(|e| Error::io(path, e))
}

fn compute_md5_sync(path: &Path) -> std::io::Result<String> {
    let mut file = std::fs::File::open(path)?;
    let mut context = md5::Context::new();
    let mut buffer = vec![0u8; DIGEST_CHUNK_SIZE];
    loop {
        let n = file.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        context.consume(&buffer[..n]);
    }
    Ok(format!("{:x}", context.finalize()))
}

/// ETag without its surrounding quotes, lowercased
#[must_use]
pub fn normalize_etag(etag: &str) -> String {
    etag.replace('"', "").to_ascii_lowercase()
}

/// Composite ETag produced by multipart uploads
#[must_use]
pub fn is_multipart_etag(etag: &str) -> bool {
    normalize_etag(etag)
        .split_once('-')
        .is_some_and(|(hex, parts)| {
            !hex.is_empty()
                && hex.chars().all(|c| c.is_ascii_hexdigit())
                && !parts.is_empty()
                && parts.chars().all(|c| c.is_ascii_digit())
        })
}

/// Local digest and normalized remote ETag of one comparison
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestComparison {
    pub local: String,
    pub remote: String,
}

impl DigestComparison {
    #[must_use]
    pub fn matches(&self) -> bool {
        self.local == self.remote
    }
}

/// Hash the file at `path` and pair it with `remote_etag`
pub async fn compare(path: &Path, remote_etag: &str) -> Result<DigestComparison> {
    let comparison = DigestComparison {
        local: file_md5(path).await?,
        remote: normalize_etag(remote_etag),
    };
    if !comparison.matches() && is_multipart_etag(remote_etag) {
        debug!(
            "Remote ETag {} is a multipart ETag and cannot match a plain MD5 of {}",
            remote_etag,
            path.display()
        );
    }
    Ok(comparison)
}

/// Whether the file at `path` has the content identified by `remote_etag`
pub async fn in_sync(path: &Path, remote_etag: &str) -> Result<bool> {
    Ok(compare(path, remote_etag).await?.matches())
}
