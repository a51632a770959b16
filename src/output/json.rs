//! JSON output for scripting.
//!
//! Nothing is written until the run completes; then a single document is
//! printed.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "root": "/home/user/Pictures",
//!   "root_exists": true,
//!   "duplicates": [
//!     {
//!       "path": "/home/user/Pictures/b.jpg",
//!       "survivor": "/home/user/Pictures/a.jpg",
//!       "fingerprint": "ea8f163d...",
//!       "size": 1024,
//!       "removed": true
//!     }
//!   ],
//!   "failures": [
//!     { "path": "/home/user/Pictures/locked.jpg", "kind": "delete", "message": "..." }
//!   ],
//!   "summary": {
//!     "files_scanned": 3,
//!     "unique_files": 2,
//!     "duplicates_removed": 1,
//!     "bytes_freed": 1024,
//!     "freed_mb": "0.00",
//!     "skipped_files": 0,
//!     "failed_deletions": 0,
//!     "verify_mismatches": 0,
//!     "dry_run": false,
//!     "interrupted": false,
//!     "duration_ms": 12,
//!     "exit_code": 0,
//!     "exit_code_name": "DS000"
//!   }
//! }
//! ```
//!
//! When the root is missing or not a directory the document is still
//! printed, with empty lists, an `error` message and exit code 2.

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::Reporter;
use crate::dedup::{DuplicatePair, FileFailure, RunResult};
use crate::error::ExitCode;

/// Summary statistics in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    pub files_scanned: usize,
    pub unique_files: usize,
    pub duplicates_removed: usize,
    pub bytes_freed: u64,
    /// Freed space in MB, two decimals
    pub freed_mb: String,
    pub skipped_files: usize,
    pub failed_deletions: usize,
    pub verify_mismatches: usize,
    pub dry_run: bool,
    pub interrupted: bool,
    pub duration_ms: u64,
    /// The exit code number
    pub exit_code: i32,
    /// The machine-readable exit code name (e.g., "DS000")
    pub exit_code_name: String,
}

impl JsonSummary {
    /// Create a JSON summary from a run result.
    #[must_use]
    pub fn from_run_result(result: &RunResult) -> Self {
        let exit_code = ExitCode::from_run_result(result);
        Self {
            files_scanned: result.files_scanned,
            unique_files: result.unique_files,
            duplicates_removed: result.duplicates_removed,
            bytes_freed: result.bytes_freed,
            freed_mb: result.freed_mb_display(),
            skipped_files: result.skipped_files,
            failed_deletions: result.failed_deletions,
            verify_mismatches: result.verify_mismatches,
            dry_run: result.dry_run,
            interrupted: result.interrupted,
            duration_ms: result.duration_ms,
            exit_code: exit_code.as_i32(),
            exit_code_name: exit_code.code_prefix().to_string(),
        }
    }
}

/// Complete JSON document.
#[derive(Debug, Serialize)]
pub struct JsonOutput<'a> {
    pub root: Option<&'a Path>,
    pub root_exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'a str>,
    pub duplicates: &'a [DuplicatePair],
    pub failures: &'a [FileFailure],
    pub summary: JsonSummary,
}

impl<'a> JsonOutput<'a> {
    /// Build the document for a finished run.
    #[must_use]
    pub fn new(root: Option<&'a Path>, root_exists: bool, result: &'a RunResult) -> Self {
        Self {
            root,
            root_exists,
            error: None,
            duplicates: &result.duplicates,
            failures: &result.failures,
            summary: JsonSummary::from_run_result(result),
        }
    }

    /// Build the document for a run that stopped at an invalid root.
    #[must_use]
    pub fn invalid_root(
        root: &'a Path,
        root_exists: bool,
        message: &'a str,
        empty: &'a RunResult,
    ) -> Self {
        let mut summary = JsonSummary::from_run_result(empty);
        summary.exit_code = ExitCode::InvalidRoot.as_i32();
        summary.exit_code_name = ExitCode::InvalidRoot.code_prefix().to_string();
        Self {
            root: Some(root),
            root_exists,
            error: Some(message),
            duplicates: &empty.duplicates,
            failures: &empty.failures,
            summary,
        }
    }

    /// Serialize as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (e.g. a non-UTF-8 path).
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Collects run events and prints one JSON document at the end.
pub struct JsonReporter<W: Write> {
    out: W,
    root: Option<PathBuf>,
    root_exists: bool,
}

impl<W: Write> JsonReporter<W> {
    /// Create a reporter writing to `out`.
    pub fn new(out: W) -> Self {
        Self {
            out,
            root: None,
            root_exists: false,
        }
    }

    /// Give back the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> JsonReporter<W> {
    fn emit(&mut self, output: &JsonOutput<'_>) {
        match output.to_json_pretty() {
            Ok(json) => {
                if let Err(e) = writeln!(self.out, "{json}").and_then(|()| self.out.flush()) {
                    log::error!("Failed to write JSON report: {}", e);
                }
            }
            Err(e) => log::error!("Failed to serialize JSON report: {}", e),
        }
    }
}

impl<W: Write> Reporter for JsonReporter<W> {
    fn on_preflight(&mut self, root: &Path, exists: bool) {
        self.root = Some(root.to_path_buf());
        self.root_exists = exists;
    }

    fn on_duplicate(&mut self, _pair: &DuplicatePair) {}

    fn on_failure(&mut self, _failure: &FileFailure) {}

    fn on_complete(&mut self, result: &RunResult) {
        let root = self.root.clone();
        let output = JsonOutput::new(root.as_deref(), self.root_exists, result);
        self.emit(&output);
    }

    fn on_invalid_root(&mut self, root: &Path, message: &str) {
        let empty = RunResult::default();
        let output = JsonOutput::invalid_root(root, self.root_exists, message, &empty);
        self.emit(&output);
    }
}
