//! # Atomic File Writes
//!
//! Downloads are written to a temporary file in the destination directory and
//! renamed over the destination only once every byte is on disk. A transfer
//! that fails midway leaves the previous file (or no file) in place, never a
//! truncated one.

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use tempfile::TempPath;
use tokio::io::AsyncWriteExt;

/// Temporary file that replaces `destination` on [`AtomicFile::commit`].
/// Dropping it without committing removes the temporary file.
#[derive(Debug)]
pub struct AtomicFile {
    destination: PathBuf,
    file: tokio::fs::File,
    temp_path: TempPath,
    written: u64,
}

impl AtomicFile {
    /// Create the temporary file next to `destination`.
    /// The destination's directory must already exist.
    pub async fn create(destination: &Path) -> Result<Self> {
        let directory = destination
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        let prefix = format!(
            ".{}.",
            destination
                .file_name()
                .map_or_else(|| "download".into(), |name| name.to_string_lossy())
        );

        let temp = tempfile::Builder::new()
            .prefix(&prefix)
            .suffix(".tmp")
            .tempfile_in(directory)
            .map_err(|e| Error::io(destination, e))?;
        let (file, temp_path) = temp.into_parts();

        Ok(Self {
            destination: destination.to_path_buf(),
            file: tokio::fs::File::from_std(file),
            temp_path,
            written: 0,
        })
    }

    pub async fn write(&mut self, chunk: &[u8]) -> Result<()> {
        self.file
            .write_all(chunk)
            .await
            .map_err(|e| Error::io(&self.temp_path, e))?;
        self.written += chunk.len() as u64;
        Ok(())
    }

    /// Flush, sync and rename over the destination.
    /// Returns the number of bytes written.
    pub async fn commit(mut self) -> Result<u64> {
        self.file
            .flush()
            .await
            .map_err(|e| Error::io(&self.temp_path, e))?;
        self.file
            .sync_all()
            .await
            .map_err(|e| Error::io(&self.temp_path, e))?;
        drop(self.file);

        apply_permissions(&self.temp_path, &self.destination)?;

        self.temp_path
            .persist(&self.destination)
            .map_err(|e| Error::io(&self.destination, e.error))?;
        Ok(self.written)
    }
}

/// The temporary file is created `0600`. Keep the mode of the file being
/// replaced, or use `0644` for a new file.
fn apply_permissions(temp_path: &Path, destination: &Path) -> Result<()> {
    let permissions = match std::fs::metadata(destination) {
        Ok(existing) => existing.permissions(),
        Err(_) => default_permissions(temp_path)?,
    };
    std::fs::set_permissions(temp_path, permissions).map_err(|e| Error::io(temp_path, e))
}

#[cfg(unix)]
fn default_permissions(_temp_path: &Path) -> Result<std::fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Ok(std::fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn default_permissions(temp_path: &Path) -> Result<std::fs::Permissions> {
    std::fs::metadata(temp_path)
        .map(|m| m.permissions())
        .map_err(|e| Error::io(temp_path, e))
}

/// Write `bytes` to `destination` atomically
pub async fn write_atomically(destination: &Path, bytes: &[u8]) -> Result<u64> {
    let mut file = AtomicFile::create(destination).await?;
    file.write(bytes).await?;
    file.commit().await
}
