//! Duplicate file removal.
//!
//! # Overview
//!
//! This module provides the deletion step of a run:
//! - Permanent deletion (the only destructive mode; there is no trash)
//! - Dry-run mode that reports what would be removed without touching it
//! - Size capture before removal so freed space is credited accurately
//!
//! # Safety
//!
//! The file's size is read before it is removed. If the size can't be read,
//! deletion is not attempted. A failed removal never reports a size, so the
//! caller can't credit space that was not actually freed.
//!
//! # Example
//!
//! ```no_run
//! use dupsweep::actions::delete::{delete_file, DeleteMode};
//! use std::path::Path;
//!
//! match delete_file(Path::new("/path/to/duplicate.txt"), DeleteMode::Permanent) {
//!     Ok(result) => println!("Deleted: {} ({} bytes)", result.path.display(), result.size),
//!     Err(e) => eprintln!("Failed: {}", e),
//! }
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Error type for deletion operations.
#[derive(Debug, Error)]
pub enum DeleteError {
    /// File was not found (may have been deleted or moved).
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    /// Permission denied when attempting to delete.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// Permanent delete operation failed.
    #[error("permanent delete failed for {path}: {message}")]
    PermanentDeleteFailed { path: PathBuf, message: String },

    /// General I/O error.
    #[error("I/O error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl DeleteError {
    /// Get the path associated with this error.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound(p)
            | Self::PermissionDenied(p)
            | Self::PermanentDeleteFailed { path: p, .. }
            | Self::Io { path: p, .. } => p,
        }
    }

    fn from_io(path: &Path, e: io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: e,
            },
        }
    }
}

/// How a duplicate should be handled once it has been identified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeleteMode {
    /// Remove the file from disk. Irreversible.
    #[default]
    Permanent,
    /// Report only; the file is left in place.
    DryRun,
}

/// Result of a successful deletion (or dry-run) of one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteResult {
    /// Path that was deleted.
    pub path: PathBuf,
    /// Size of the deleted file in bytes.
    pub size: u64,
    /// Whether the file was left in place (dry run).
    pub dry_run: bool,
}

impl DeleteResult {
    /// Create a new delete result.
    #[must_use]
    pub fn new(path: PathBuf, size: u64, dry_run: bool) -> Self {
        Self {
            path,
            size,
            dry_run,
        }
    }
}

/// Read the on-disk size of a file.
///
/// # Errors
///
/// Returns `NotFound`, `PermissionDenied` or `Io` if metadata can't be read.
pub fn file_size(path: &Path) -> Result<u64, DeleteError> {
    fs::metadata(path)
        .map(|m| m.len())
        .map_err(|e| DeleteError::from_io(path, e))
}

/// Permanently delete a single file.
///
/// **WARNING**: This operation cannot be undone.
///
/// # Errors
///
/// - `NotFound` if the file doesn't exist
/// - `PermissionDenied` if the size can't be read or the file can't be removed
/// - `PermanentDeleteFailed` for any other removal failure
pub fn permanent_delete(path: &Path) -> Result<DeleteResult, DeleteError> {
    let size = file_size(path)?;

    fs::remove_file(path).map_err(|e| {
        log::debug!("Permanent delete failed for {}: {}", path.display(), e);
        match e.kind() {
            io::ErrorKind::NotFound => DeleteError::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => DeleteError::PermissionDenied(path.to_path_buf()),
            _ => DeleteError::PermanentDeleteFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            },
        }
    })?;

    log::debug!("Permanently deleted: {} ({} bytes)", path.display(), size);

    Ok(DeleteResult::new(path.to_path_buf(), size, false))
}

/// Delete a file according to `mode`.
///
/// In [`DeleteMode::DryRun`] the size is still read, so a dry run reports the
/// same reclaimable total a real run would free.
///
/// # Errors
///
/// See [`permanent_delete`] and [`file_size`].
pub fn delete_file(path: &Path, mode: DeleteMode) -> Result<DeleteResult, DeleteError> {
    match mode {
        DeleteMode::Permanent => permanent_delete(path),
        DeleteMode::DryRun => {
            let size = file_size(path)?;
            log::debug!("Dry run, would delete: {} ({} bytes)", path.display(), size);
            Ok(DeleteResult::new(path.to_path_buf(), size, true))
        }
    }
}
