//! Line-oriented console output.
//!
//! # Format
//!
//! ```text
//! The folder exists: /home/user/Pictures
//! Duplicate found: /home/user/Pictures/b.jpg (same as /home/user/Pictures/a.jpg)
//!
//! Total storage freed: 1.25 MB
//! ```

use std::io::Write;
use std::path::Path;

use yansi::{Color, Paint};

use super::Reporter;
use crate::dedup::{DuplicatePair, FileFailure, RunResult};

/// Writes the human-readable report to any writer (normally stdout).
pub struct ConsoleReporter<W: Write> {
    out: W,
    color: bool,
}

impl<W: Write> ConsoleReporter<W> {
    /// Create a reporter. `color` enables ANSI styling.
    pub fn new(out: W, color: bool) -> Self {
        Self { out, color }
    }

    /// Give back the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn styled(&self, text: &str, color: Color) -> String {
        if self.color {
            text.paint(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn line(&mut self, text: std::fmt::Arguments<'_>) {
        if let Err(e) = self.out.write_fmt(text).and_then(|()| self.out.write_all(b"\n")) {
            log::debug!("Failed to write report line: {}", e);
        }
    }
}

impl<W: Write> Reporter for ConsoleReporter<W> {
    fn on_preflight(&mut self, root: &Path, exists: bool) {
        if exists {
            self.line(format_args!("The folder exists: {}", root.display()));
        } else {
            let label = self.styled("The folder does not exist:", Color::Red);
            self.line(format_args!("{} {}", label, root.display()));
        }
    }

    fn on_duplicate(&mut self, pair: &DuplicatePair) {
        let label = self.styled("Duplicate found:", Color::Yellow);
        self.line(format_args!(
            "{} {} (same as {})",
            label,
            pair.path.display(),
            pair.survivor.display()
        ));
    }

    fn on_failure(&mut self, failure: &FileFailure) {
        let label = self.styled("Failed:", Color::Red);
        self.line(format_args!(
            "{} {} ({}: {})",
            label,
            failure.path.display(),
            failure.kind,
            failure.message
        ));
    }

    fn on_complete(&mut self, result: &RunResult) {
        self.line(format_args!(""));
        if result.interrupted {
            let label = self.styled("Interrupted:", Color::Red);
            self.line(format_args!("{} results below are partial", label));
        }

        let total = self.styled(&format!("{} MB", result.freed_mb_display()), Color::Green);
        if result.dry_run {
            self.line(format_args!("Total storage that would be freed: {} (dry run)", total));
        } else {
            self.line(format_args!("Total storage freed: {}", total));
        }

        if result.has_failures() {
            self.line(format_args!(
                "{} file(s) skipped or not deleted",
                result.failures.len()
            ));
        }

        if let Err(e) = self.out.flush() {
            log::debug!("Failed to flush report: {}", e);
        }
    }
}
