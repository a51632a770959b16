//! Reporting of run progress and results.
//!
//! A run talks to the outside world only through the [`Reporter`] trait:
//! - [`console::ConsoleReporter`] prints one line per duplicate and a summary
//! - [`json::JsonReporter`] prints a single JSON document when the run ends
//!
//! # Example
//!
//! ```no_run
//! use dupsweep::dedup::{DedupConfig, Deduplicator};
//! use dupsweep::output::ConsoleReporter;
//! use std::path::Path;
//!
//! let dedup = Deduplicator::new(DedupConfig::default().with_dry_run(true));
//! let mut reporter = ConsoleReporter::new(std::io::stdout(), false);
//! let result = dedup.run(Path::new("/some/path"), &mut reporter).unwrap();
//! println!("{}", result.summary());
//! ```

pub mod console;
pub mod json;

use std::path::Path;

use crate::dedup::{DuplicatePair, FileFailure, RunResult};

// Re-export main types
pub use console::ConsoleReporter;
pub use json::JsonReporter;

/// Receives events from a deduplication run, in traversal order.
pub trait Reporter {
    /// Called once before scanning, with whether the root exists.
    fn on_preflight(&mut self, root: &Path, exists: bool);

    /// Called for every duplicate, after its deletion was attempted.
    fn on_duplicate(&mut self, pair: &DuplicatePair);

    /// Called for every file that was skipped or could not be deleted.
    fn on_failure(&mut self, failure: &FileFailure);

    /// Called once when the run ends, including interrupted runs.
    fn on_complete(&mut self, result: &RunResult);

    /// Called instead of [`Reporter::on_complete`] when the root is missing
    /// or not a directory. Nothing was scanned.
    fn on_invalid_root(&mut self, _root: &Path, _message: &str) {}
}

/// Reporter that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn on_preflight(&mut self, _root: &Path, _exists: bool) {}
    fn on_duplicate(&mut self, _pair: &DuplicatePair) {}
    fn on_failure(&mut self, _failure: &FileFailure) {}
    fn on_complete(&mut self, _result: &RunResult) {}
}
