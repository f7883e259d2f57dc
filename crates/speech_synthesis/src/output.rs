//! Atomic audio file output
//!
//! Audio is written to a temporary file next to the destination and
//! renamed over it once complete, so readers never observe a partially
//! written file at the destination path. A replaced file keeps its
//! permissions; a new file gets the usual umask-derived mode.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::Builder;
use tracing::debug;

use crate::error::SpeechError;

/// Write `bytes` to `path`, replacing any existing file
///
/// # Errors
///
/// Returns `SpeechError::Write` if the parent directory is missing or not
/// writable, or if writing or renaming fails.
pub async fn write_atomically(path: &Path, bytes: Vec<u8>) -> Result<(), SpeechError> {
    let destination = path.to_path_buf();
    let owned = destination.clone();

    tokio::task::spawn_blocking(move || write_blocking(&owned, &bytes))
        .await
        .map_err(|e| SpeechError::Write {
            path: destination,
            source: std::io::Error::other(e),
        })?
}

fn write_blocking(path: &Path, bytes: &[u8]) -> Result<(), SpeechError> {
    let write_error = |source| SpeechError::Write {
        path: path.to_path_buf(),
        source,
    };

    if path.as_os_str().is_empty() {
        return Err(write_error(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "destination path is empty",
        )));
    }

    let directory = parent_directory(path);
    let mut file = Builder::new()
        .prefix(".logos-tts")
        .make_in(&directory, create_file)
        .map_err(write_error)?;

    if let Ok(existing) = std::fs::metadata(path) {
        file.as_file()
            .set_permissions(existing.permissions())
            .map_err(write_error)?;
    }

    file.write_all(bytes).map_err(write_error)?;
    file.as_file().sync_all().map_err(write_error)?;
    file.persist(path).map_err(|e| write_error(e.error))?;

    debug!(path = %path.display(), bytes = bytes.len(), "Audio written");
    Ok(())
}

/// Create a file the way `File::create` would, so the umask applies
fn create_file(path: &Path) -> std::io::Result<File> {
    OpenOptions::new().write(true).create_new(true).open(path)
}

/// Directory holding `path`; relative file names live in the current directory
fn parent_directory(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
