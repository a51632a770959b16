//! Run outcome types.
//!
//! [`RunResult`] is built up while a run progresses and handed back to the
//! caller once traversal ends. It is the only state a run leaves behind.

use std::path::PathBuf;

use serde::Serialize;

const MB: f64 = 1024.0 * 1024.0;

/// A duplicate and the survivor it matched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicatePair {
    /// The later file with the same content
    pub path: PathBuf,
    /// The first file seen with this content; never deleted
    pub survivor: PathBuf,
    /// BLAKE3 fingerprint as hex
    pub fingerprint: String,
    /// Bytes credited for this file (0 if it was not removed)
    pub size: u64,
    /// Whether the file was removed (or would be, in a dry run)
    pub removed: bool,
}

/// Which stage a per-file failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Directory entry couldn't be read during traversal
    Scan,
    /// File couldn't be opened or read while fingerprinting
    Read,
    /// Duplicate couldn't be removed
    Delete,
    /// Fingerprints matched but bytes differed (verify mode)
    VerifyMismatch,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Scan => write!(f, "scan error"),
            Self::Read => write!(f, "read error"),
            Self::Delete => write!(f, "delete error"),
            Self::VerifyMismatch => write!(f, "verify mismatch"),
        }
    }
}

/// A file that was skipped or could not be deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileFailure {
    /// Path the failure relates to
    pub path: PathBuf,
    /// Stage that failed
    pub kind: FailureKind,
    /// Human-readable error
    pub message: String,
}

/// Outcome of one deduplication run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunResult {
    /// Files yielded by traversal and considered
    pub files_scanned: usize,
    /// Files kept as the survivor of their fingerprint
    pub unique_files: usize,
    /// Duplicates removed (or that would be removed, in a dry run)
    pub duplicates_removed: usize,
    /// Total bytes of removed duplicates
    pub bytes_freed: u64,
    /// Files skipped because they couldn't be read or reached
    pub skipped_files: usize,
    /// Duplicates whose removal failed
    pub failed_deletions: usize,
    /// Fingerprint matches rejected by byte comparison
    pub verify_mismatches: usize,
    /// Whether nothing was actually deleted
    pub dry_run: bool,
    /// Whether the run stopped early on a shutdown request
    pub interrupted: bool,
    /// Wall-clock time of the run in milliseconds
    pub duration_ms: u64,
    /// Every duplicate found, in traversal order
    pub duplicates: Vec<DuplicatePair>,
    /// Every per-file failure, in traversal order
    pub failures: Vec<FileFailure>,
}

impl RunResult {
    /// Freed space in megabytes (`bytes / (1024 * 1024)`).
    #[must_use]
    pub fn freed_mb(&self) -> f64 {
        self.bytes_freed as f64 / MB
    }

    /// Freed space formatted with two decimals, e.g. `"1.50"`.
    #[must_use]
    pub fn freed_mb_display(&self) -> String {
        format!("{:.2}", self.freed_mb())
    }

    /// Whether any file was skipped or failed to delete.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// One-line summary for logs.
    #[must_use]
    pub fn summary(&self) -> String {
        let verb = if self.dry_run { "would remove" } else { "removed" };
        format!(
            "Scanned {} file(s), {} {} duplicate(s), {} failure(s), {} MB",
            self.files_scanned,
            verb,
            self.duplicates_removed,
            self.failures.len(),
            self.freed_mb_display()
        )
    }
}
