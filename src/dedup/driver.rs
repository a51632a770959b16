//! Deduplication driver.
//!
//! # Overview
//!
//! For every file yielded by the walker, in traversal order:
//! 1. Fingerprint it. Unreadable files are reported and skipped.
//! 2. Look the fingerprint up in the [`SeenIndex`].
//!    - New: the file becomes the survivor for that fingerprint.
//!    - Known: the file is a duplicate. Its size is read, it is deleted, and
//!      its size is credited only if deletion succeeded.
//!
//! There is no backtracking; each file is decided exactly once.
//!
//! # Parallel fingerprinting
//!
//! With `io_threads > 1`, paths are pulled from the walker in batches and
//! each batch is hashed on a bounded rayon pool. Results come back in
//! traversal order and the keep/delete decisions are made sequentially, so
//! the survivor of every fingerprint is the same as in a single-threaded run.
//!
//! # Cancellation
//!
//! The shutdown flag is checked by the walker, by the hasher between chunks,
//! and here before every deletion. A file whose hash was interrupted is never
//! deleted.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;

use super::index::{Lookup, SeenIndex};
use super::result::{DuplicatePair, FailureKind, FileFailure, RunResult};
use crate::actions::delete::{delete_file, DeleteMode};
use crate::output::Reporter;
use crate::progress::ProgressCallback;
use crate::scanner::{
    hash_to_hex, Hash, HashError, Hasher, ScanError, Walker, DEFAULT_CHUNK_SIZE, MAX_CHUNK_SIZE,
};

/// Default number of paths hashed together when running in parallel.
pub const DEFAULT_BATCH_SIZE: usize = 256;

/// Configuration for a deduplication run.
#[derive(Clone)]
pub struct DedupConfig {
    /// Delete duplicates, or only report them.
    pub mode: DeleteMode,
    /// Compare bytes with the survivor before deleting.
    pub verify: bool,
    /// Fingerprinting workers (1 = sequential).
    pub io_threads: usize,
    /// Paths hashed per batch when `io_threads > 1`.
    pub batch_size: usize,
    /// Read size used by the hasher.
    pub chunk_size: usize,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for DedupConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DedupConfig")
            .field("mode", &self.mode)
            .field("verify", &self.verify)
            .field("io_threads", &self.io_threads)
            .field("batch_size", &self.batch_size)
            .field("chunk_size", &self.chunk_size)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            mode: DeleteMode::Permanent,
            verify: false,
            io_threads: 1,
            batch_size: DEFAULT_BATCH_SIZE,
            chunk_size: DEFAULT_CHUNK_SIZE,
            shutdown_flag: None,
            progress_callback: None,
        }
    }
}

impl DedupConfig {
    /// Report duplicates without deleting them.
    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.mode = if dry_run {
            DeleteMode::DryRun
        } else {
            DeleteMode::Permanent
        };
        self
    }

    /// Enable byte-for-byte verification before deletion.
    #[must_use]
    pub fn with_verify(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    /// Set the number of fingerprinting workers (minimum 1).
    #[must_use]
    pub fn with_io_threads(mut self, threads: usize) -> Self {
        self.io_threads = threads.max(1);
        self
    }

    /// Set the batch size for parallel fingerprinting (minimum 1).
    #[must_use]
    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size.max(1);
        self
    }

    /// Set the hasher's read size, clamped to `1..=MAX_CHUNK_SIZE`.
    #[must_use]
    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size.clamp(1, MAX_CHUNK_SIZE);
        self
    }

    /// Set the shutdown flag.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }
}

/// Errors that end a run before any file is touched.
#[derive(thiserror::Error, Debug)]
pub enum DedupError {
    /// The root path does not exist.
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// The root path is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// The root could not be inspected.
    #[error(transparent)]
    Scan(ScanError),

    /// The fingerprinting thread pool could not be created.
    #[error("Failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl From<ScanError> for DedupError {
    fn from(err: ScanError) -> Self {
        match err {
            ScanError::NotFound(p) => Self::PathNotFound(p),
            ScanError::NotADirectory(p) => Self::NotADirectory(p),
            other => Self::Scan(other),
        }
    }
}

impl DedupError {
    /// Whether this error means the root itself was invalid.
    #[must_use]
    pub fn is_invalid_root(&self) -> bool {
        matches!(self, Self::PathNotFound(_) | Self::NotADirectory(_) | Self::Scan(_))
    }
}

/// State owned by one run.
struct RunState {
    index: SeenIndex,
    result: RunResult,
}

impl RunState {
    fn new(dry_run: bool) -> Self {
        Self {
            index: SeenIndex::new(),
            result: RunResult {
                dry_run,
                ..Default::default()
            },
        }
    }

    fn record_failure<R: Reporter + ?Sized>(
        &mut self,
        reporter: &mut R,
        path: &Path,
        kind: FailureKind,
        message: String,
    ) {
        log::debug!("{} for {}: {}", kind, path.display(), message);
        match kind {
            FailureKind::Scan | FailureKind::Read => self.result.skipped_files += 1,
            FailureKind::Delete => self.result.failed_deletions += 1,
            FailureKind::VerifyMismatch => self.result.verify_mismatches += 1,
        }
        let failure = FileFailure {
            path: path.to_path_buf(),
            kind,
            message,
        };
        reporter.on_failure(&failure);
        self.result.failures.push(failure);
    }
}

/// Removes duplicate files under a root directory.
///
/// # Example
///
/// ```no_run
/// use dupsweep::dedup::{DedupConfig, Deduplicator};
/// use dupsweep::output::NullReporter;
/// use std::path::Path;
///
/// let dedup = Deduplicator::new(DedupConfig::default().with_dry_run(true));
/// let result = dedup.run(Path::new("/some/path"), &mut NullReporter).unwrap();
/// println!("Would free {} MB", result.freed_mb_display());
/// ```
pub struct Deduplicator {
    config: DedupConfig,
    hasher: Hasher,
}

impl Deduplicator {
    /// Create a deduplicator with the given configuration.
    #[must_use]
    pub fn new(config: DedupConfig) -> Self {
        let mut hasher = Hasher::new().with_chunk_size(config.chunk_size);
        if let Some(ref flag) = config.shutdown_flag {
            hasher = hasher.with_shutdown_flag(Arc::clone(flag));
        }
        Self { config, hasher }
    }

    /// Create a deduplicator with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(DedupConfig::default())
    }

    /// Deduplicate everything under `root`.
    ///
    /// The reporter receives the preflight result first, then each duplicate
    /// and failure as it happens, then the final result.
    ///
    /// # Errors
    ///
    /// Returns `DedupError` if the root is missing or not a directory (the
    /// preflight is still reported, nothing else happens), or if the worker
    /// pool can't be built. Per-file problems never end up here; they are in
    /// [`RunResult::failures`].
    pub fn run<R: Reporter + ?Sized>(
        &self,
        root: &Path,
        reporter: &mut R,
    ) -> Result<RunResult, DedupError> {
        let start_time = Instant::now();

        let exists = root.exists();
        reporter.on_preflight(root, exists);

        let mut walker = Walker::new(root);
        if let Some(ref flag) = self.config.shutdown_flag {
            walker = walker.with_shutdown_flag(Arc::clone(flag));
        }
        let paths = match walker.walk() {
            Ok(paths) => paths,
            Err(e) => {
                log::error!("Cannot scan {}: {}", root.display(), e);
                let err = DedupError::from(e);
                reporter.on_invalid_root(root, &err.to_string());
                return Err(err);
            }
        };

        let pool = if self.config.io_threads > 1 {
            Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(self.config.io_threads)
                    .build()?,
            )
        } else {
            None
        };
        let batch_size = if pool.is_some() {
            self.config.batch_size
        } else {
            1
        };

        log::info!(
            "Scanning {} ({} fingerprint worker(s){})",
            root.display(),
            self.config.io_threads,
            if self.config.mode == DeleteMode::DryRun {
                ", dry run"
            } else {
                ""
            }
        );

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_start("scan", 0);
        }

        let mut state = RunState::new(self.config.mode == DeleteMode::DryRun);
        let mut batch: Vec<PathBuf> = Vec::with_capacity(batch_size);

        for entry in paths {
            match entry {
                Ok(path) => {
                    batch.push(path);
                    if batch.len() >= batch_size {
                        self.process_batch(std::mem::take(&mut batch), pool.as_ref(), &mut state, reporter);
                        if state.result.interrupted {
                            break;
                        }
                    }
                }
                Err(e) => {
                    let path = e.path().to_path_buf();
                    state.record_failure(reporter, &path, FailureKind::Scan, e.to_string());
                }
            }
        }

        if !state.result.interrupted && !batch.is_empty() {
            self.process_batch(batch, pool.as_ref(), &mut state, reporter);
        }

        if self.config.is_shutdown_requested() {
            state.result.interrupted = true;
        }

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_end("scan");
        }

        log::debug!("{} distinct fingerprint(s) indexed", state.index.len());
        let mut result = state.result;
        result.duration_ms = u64::try_from(start_time.elapsed().as_millis()).unwrap_or(u64::MAX);

        log::info!("{} in {} ms", result.summary(), result.duration_ms);
        if result.interrupted {
            log::warn!("Run interrupted before traversal finished");
        }

        reporter.on_complete(&result);
        Ok(result)
    }

    /// Fingerprint a batch (in parallel when a pool is given), then decide
    /// each file in order.
    fn process_batch<R: Reporter + ?Sized>(
        &self,
        batch: Vec<PathBuf>,
        pool: Option<&rayon::ThreadPool>,
        state: &mut RunState,
        reporter: &mut R,
    ) {
        let hashed: Vec<(PathBuf, Result<Hash, HashError>)> = match pool {
            Some(pool) => pool.install(|| {
                batch
                    .into_par_iter()
                    .map(|path| {
                        let hash = self.hasher.fingerprint(&path);
                        (path, hash)
                    })
                    .collect()
            }),
            None => batch
                .into_iter()
                .map(|path| {
                    let hash = self.hasher.fingerprint(&path);
                    (path, hash)
                })
                .collect(),
        };

        for (path, hash) in hashed {
            self.decide(path, hash, state, reporter);
            if state.result.interrupted {
                return;
            }
        }
    }

    /// Keep or delete one fingerprinted file.
    fn decide<R: Reporter + ?Sized>(
        &self,
        path: PathBuf,
        hash: Result<Hash, HashError>,
        state: &mut RunState,
        reporter: &mut R,
    ) {
        let fingerprint = match hash {
            Ok(h) => h,
            Err(e) if e.is_interrupted() => {
                state.result.interrupted = true;
                return;
            }
            Err(e) => {
                state.result.files_scanned += 1;
                state.record_failure(reporter, &path, FailureKind::Read, e.to_string());
                return;
            }
        };

        state.result.files_scanned += 1;
        if let Some(ref callback) = self.config.progress_callback {
            callback.on_progress(state.result.files_scanned, path.to_string_lossy().as_ref());
        }

        match state.index.observe(fingerprint, &path) {
            Lookup::Inserted => {
                state.result.unique_files += 1;
                log::trace!("Survivor: {}", path.display());
            }
            Lookup::Duplicate(survivor) => {
                self.handle_duplicate(path, survivor, fingerprint, state, reporter);
            }
        }
    }

    fn handle_duplicate<R: Reporter + ?Sized>(
        &self,
        path: PathBuf,
        survivor: PathBuf,
        fingerprint: Hash,
        state: &mut RunState,
        reporter: &mut R,
    ) {
        if self.config.verify {
            match self.hasher.files_equal(&survivor, &path) {
                Ok(true) => {}
                Ok(false) => {
                    log::warn!(
                        "Fingerprint match but content differs: {} vs {}",
                        path.display(),
                        survivor.display()
                    );
                    let message = format!("content differs from {}", survivor.display());
                    state.record_failure(reporter, &path, FailureKind::VerifyMismatch, message);
                    return;
                }
                Err(e) if e.is_interrupted() => {
                    state.result.interrupted = true;
                    return;
                }
                Err(e) => {
                    state.record_failure(reporter, &path, FailureKind::Read, e.to_string());
                    return;
                }
            }
        }

        if self.config.is_shutdown_requested() {
            log::debug!("Shutdown requested, not deleting {}", path.display());
            state.result.interrupted = true;
            return;
        }

        let outcome = delete_file(&path, self.config.mode);

        let (size, removed) = match outcome {
            Ok(ref deleted) => (deleted.size, true),
            Err(_) => (0, false),
        };
        let pair = DuplicatePair {
            path,
            survivor,
            fingerprint: hash_to_hex(&fingerprint),
            size,
            removed,
        };
        reporter.on_duplicate(&pair);

        match outcome {
            Ok(deleted) => {
                state.result.duplicates_removed += 1;
                state.result.bytes_freed += deleted.size;
                if let Some(ref callback) = self.config.progress_callback {
                    callback.on_item_completed(deleted.size);
                }
            }
            Err(e) => {
                log::warn!("Failed to delete {}: {}", pair.path.display(), e);
                state.record_failure(reporter, &pair.path, FailureKind::Delete, e.to_string());
            }
        }

        state.result.duplicates.push(pair);
    }
}
