//! dupsweep - content-based duplicate file remover
//!
//! Walks a directory tree in a fixed order, fingerprints every regular file
//! with BLAKE3, keeps the first file seen for each fingerprint and deletes
//! the rest, then reports how much storage was reclaimed.

pub mod actions;
pub mod cli;
pub mod dedup;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod signal;

use std::io::IsTerminal;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::cli::{Cli, OutputFormat};
use crate::dedup::{DedupConfig, Deduplicator};
use crate::error::ExitCode;
use crate::output::{ConsoleReporter, JsonReporter, Reporter};
use crate::progress::Progress;

/// Run the application with parsed arguments.
///
/// Returns the exit code for a run that reached its end (including
/// interrupted runs). An invalid root comes back as an error wrapping
/// [`dedup::DedupError`].
///
/// # Errors
///
/// Returns an error if the signal handler can't be installed, the root is
/// missing or not a directory, or the worker pool can't be built.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);

    if cli.no_color {
        yansi::disable();
    }

    let handler = signal::install_handler().context("Failed to set up Ctrl+C handling")?;

    let mut config = DedupConfig::default()
        .with_dry_run(cli.dry_run)
        .with_verify(cli.verify)
        .with_io_threads(usize::from(cli.io_threads))
        .with_chunk_size(cli.chunk_size)
        .with_shutdown_flag(handler.get_flag());

    if cli.progress && !cli.quiet {
        config = config.with_progress_callback(Arc::new(Progress::new()));
    }

    log::debug!("Configuration: {:?}", config);

    let dedup = Deduplicator::new(config);
    let stdout = std::io::stdout();

    let mut reporter: Box<dyn Reporter> = match cli.output {
        OutputFormat::Text => {
            let color = !cli.no_color && stdout.is_terminal();
            Box::new(ConsoleReporter::new(stdout.lock(), color))
        }
        OutputFormat::Json => Box::new(JsonReporter::new(stdout.lock())),
    };

    let result = dedup.run(&cli.path, reporter.as_mut())?;

    if handler.is_shutdown_requested() {
        log::info!("Exiting after interrupt");
    }

    Ok(ExitCode::from_run_result(&result))
}
