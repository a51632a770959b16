//! BLAKE3 file hasher with streaming support.
//!
//! # Overview
//!
//! This module provides the [`Hasher`] struct for computing BLAKE3
//! fingerprints of file contents. Files are read in bounded chunks so memory
//! use does not depend on file size. Two files with identical bytes always
//! produce the same fingerprint; names, timestamps and other metadata play
//! no part.
//!
//! # Example
//!
//! ```no_run
//! use dupsweep::scanner::{hash_to_hex, Hasher};
//! use std::path::Path;
//!
//! let hasher = Hasher::new().with_chunk_size(16 * 1024);
//! let hash = hasher.fingerprint(Path::new("photo.jpg")).unwrap();
//! println!("{}", hash_to_hex(&hash));
//! ```

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::HashError;

/// A 32-byte BLAKE3 digest.
pub type Hash = [u8; 32];

/// Default read size for streaming (64 KiB).
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Largest read size accepted (64 MiB). Each worker holds one buffer this big.
pub const MAX_CHUNK_SIZE: usize = 64 * 1024 * 1024;

/// Streaming BLAKE3 fingerprinter.
///
/// Cheap to clone; workers in a thread pool can share one through an `Arc`
/// or hold their own copy.
#[derive(Debug, Clone)]
pub struct Hasher {
    /// Bytes read per `read` call
    chunk_size: usize,
    /// Optional shutdown flag, checked between chunks
    shutdown_flag: Option<Arc<AtomicBool>>,
}

impl Default for Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher {
    /// Create a hasher with the default chunk size and no shutdown flag.
    #[must_use]
    pub fn new() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            shutdown_flag: None,
        }
    }

    /// Set the chunk size used when reading files.
    ///
    /// Clamped to `1..=MAX_CHUNK_SIZE`.
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.clamp(1, MAX_CHUNK_SIZE);
        self
    }

    /// Set the shutdown flag for cancelling long reads.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// The configured chunk size in bytes.
    #[must_use]
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Compute the BLAKE3 fingerprint of a file's full content.
    ///
    /// # Errors
    ///
    /// - `NotFound` / `PermissionDenied` / `Io` if the file can't be opened or read
    /// - `Interrupted` if shutdown was requested before the last chunk was read
    pub fn fingerprint(&self, path: &Path) -> Result<Hash, HashError> {
        let file = File::open(path).map_err(|e| HashError::from_io(path, e))?;
        let hash = self.fingerprint_reader(file, path)?;
        log::trace!("Fingerprinted {}: {}", path.display(), hash_to_hex(&hash));
        Ok(hash)
    }

    /// Compute the fingerprint of any reader. `path` is only used for errors.
    ///
    /// # Errors
    ///
    /// Same as [`Hasher::fingerprint`].
    pub fn fingerprint_reader<R: Read>(&self, mut reader: R, path: &Path) -> Result<Hash, HashError> {
        let mut hasher = blake3::Hasher::new();
        let mut buffer = vec![0u8; self.chunk_size];

        loop {
            if self.is_shutdown_requested() {
                log::debug!("Hashing interrupted: {}", path.display());
                return Err(HashError::Interrupted(path.to_path_buf()));
            }
            let bytes_read = match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(HashError::from_io(path, e)),
            };
            hasher.update(&buffer[..bytes_read]);
        }

        Ok(*hasher.finalize().as_bytes())
    }

    /// Compare two files byte for byte.
    ///
    /// Returns `Ok(false)` as soon as the lengths or any chunk differ.
    ///
    /// # Errors
    ///
    /// Returns the error of whichever file could not be opened or read.
    pub fn files_equal(&self, a: &Path, b: &Path) -> Result<bool, HashError> {
        let mut file_a = File::open(a).map_err(|e| HashError::from_io(a, e))?;
        let mut file_b = File::open(b).map_err(|e| HashError::from_io(b, e))?;

        let len_a = file_a.metadata().map_err(|e| HashError::from_io(a, e))?.len();
        let len_b = file_b.metadata().map_err(|e| HashError::from_io(b, e))?.len();
        if len_a != len_b {
            return Ok(false);
        }

        let mut buf_a = vec![0u8; self.chunk_size];
        let mut buf_b = vec![0u8; self.chunk_size];
        loop {
            if self.is_shutdown_requested() {
                return Err(HashError::Interrupted(b.to_path_buf()));
            }
            let n_a = read_full(&mut file_a, &mut buf_a).map_err(|e| HashError::from_io(a, e))?;
            let n_b = read_full(&mut file_b, &mut buf_b).map_err(|e| HashError::from_io(b, e))?;
            if n_a != n_b || buf_a[..n_a] != buf_b[..n_b] {
                return Ok(false);
            }
            if n_a == 0 {
                return Ok(true);
            }
        }
    }
}

/// Fill `buf` as far as possible; returns fewer bytes only at end of file.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Convert a hash to a lowercase hex string (64 characters).
#[must_use]
pub fn hash_to_hex(hash: &Hash) -> String {
    blake3::Hash::from(*hash).to_hex().to_string()
}
