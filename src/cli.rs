//! Command-line interface definitions.
//!
//! # Example
//!
//! ```bash
//! # Remove duplicates under ~/Pictures
//! dupsweep ~/Pictures
//!
//! # See what would be removed, without touching anything
//! dupsweep --dry-run ~/Pictures
//!
//! # Byte-compare before deleting, hash with 4 threads, JSON report
//! dupsweep --verify --io-threads 4 --output json ~/Pictures
//! ```

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::scanner::{DEFAULT_CHUNK_SIZE, MAX_CHUNK_SIZE};

/// Remove duplicate files from a directory tree.
///
/// Every regular file under PATH is fingerprinted with BLAKE3. The first file
/// seen with a given content is kept; every later file with the same content
/// is deleted.
#[derive(Debug, Parser)]
#[command(name = "dupsweep")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory to deduplicate
    #[arg(value_name = "PATH", env = "DUPSWEEP_PATH")]
    pub path: PathBuf,

    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all log output except errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, env = "NO_COLOR")]
    pub no_color: bool,

    /// Print fatal errors as JSON on stderr
    #[arg(long)]
    pub json_errors: bool,

    /// Report duplicates without deleting anything
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Compare bytes with the kept file before each deletion
    ///
    /// Slower, but a fingerprint collision can never cause a deletion.
    #[arg(long)]
    pub verify: bool,

    /// Number of threads used for fingerprinting
    ///
    /// Deletion order and the kept file are the same for any value.
    #[arg(long, value_name = "N", default_value_t = 1, value_parser = clap::value_parser!(u16).range(1..))]
    pub io_threads: u16,

    /// Read size for fingerprinting (e.g., 64KiB, 1MiB)
    ///
    /// Supports suffixes: B, KB, KiB, MB, MiB. At most 64MiB.
    #[arg(long, value_name = "SIZE", value_parser = parse_chunk_size, default_value_t = DEFAULT_CHUNK_SIZE)]
    pub chunk_size: usize,

    /// Report format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,

    /// Show a progress spinner on stderr
    #[arg(long)]
    pub progress: bool,
}

/// Output format for the run report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One line per duplicate, then a summary
    Text,
    /// A single JSON document at the end of the run
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Parse a human-readable size string into bytes.
///
/// Supports suffixes: B, KB, KiB, MB, MiB, GB, GiB, TB, TiB
/// Case-insensitive. Numbers without suffix are treated as bytes.
///
/// # Examples
///
/// ```
/// use dupsweep::cli::parse_size;
///
/// assert_eq!(parse_size("1024").unwrap(), 1024);
/// assert_eq!(parse_size("1KB").unwrap(), 1000);
/// assert_eq!(parse_size("64KiB").unwrap(), 65_536);
/// assert_eq!(parse_size("1MiB").unwrap(), 1_048_576);
/// ```
///
/// # Errors
///
/// Returns an error if the string is empty, contains an invalid number,
/// a negative number, or an unknown size suffix.
pub fn parse_size(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("Size cannot be empty".to_string());
    }

    let (num_str, suffix) = match s.find(|c: char| !c.is_ascii_digit() && c != '.') {
        Some(idx) => (&s[..idx], s[idx..].trim().to_uppercase()),
        None => (s, String::new()),
    };

    let num: f64 = num_str
        .parse()
        .map_err(|_| format!("Invalid number: '{num_str}'"))?;

    if num < 0.0 {
        return Err("Size cannot be negative".to_string());
    }

    let multiplier: u64 = match suffix.as_str() {
        "" | "B" => 1,
        "KB" | "K" => 1_000,
        "KIB" => 1_024,
        "MB" | "M" => 1_000_000,
        "MIB" => 1_048_576,
        "GB" | "G" => 1_000_000_000,
        "GIB" => 1_073_741_824,
        "TB" | "T" => 1_000_000_000_000,
        "TIB" => 1_099_511_627_776,
        _ => return Err(format!("Unknown size suffix: '{suffix}'")),
    };

    Ok((num * multiplier as f64) as u64)
}

/// Parse a chunk size: a [`parse_size`] value between 1 byte and
/// [`MAX_CHUNK_SIZE`].
///
/// # Errors
///
/// Returns an error for anything [`parse_size`] rejects, for zero, and for
/// values above [`MAX_CHUNK_SIZE`].
pub fn parse_chunk_size(s: &str) -> Result<usize, String> {
    let bytes = parse_size(s)?;
    if bytes == 0 {
        return Err("Chunk size must be at least 1 byte".to_string());
    }
    match usize::try_from(bytes) {
        Ok(size) if size <= MAX_CHUNK_SIZE => Ok(size),
        _ => Err(format!(
            "Chunk size too large: {bytes} bytes (maximum is {MAX_CHUNK_SIZE})"
        )),
    }
}
