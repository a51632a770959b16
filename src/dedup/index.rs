//! Fingerprint → survivor index.
//!
//! The first path observed for a fingerprint becomes its survivor and is
//! never replaced. Later paths with the same fingerprint are reported as
//! duplicates of it.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::scanner::Hash;

/// Outcome of [`SeenIndex::observe`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// The fingerprint was new; the observed path is now its survivor.
    Inserted,
    /// The fingerprint was already indexed; holds the survivor's path.
    Duplicate(PathBuf),
}

/// Mapping from fingerprint to the first path seen with it.
///
/// Owned by a single run and dropped when the run ends.
#[derive(Debug, Default)]
pub struct SeenIndex {
    entries: HashMap<Hash, PathBuf>,
}

impl SeenIndex {
    /// Create an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `path` under `fingerprint` unless a survivor already exists.
    pub fn observe(&mut self, fingerprint: Hash, path: &Path) -> Lookup {
        use std::collections::hash_map::Entry;

        match self.entries.entry(fingerprint) {
            Entry::Occupied(entry) => Lookup::Duplicate(entry.get().clone()),
            Entry::Vacant(entry) => {
                entry.insert(path.to_path_buf());
                Lookup::Inserted
            }
        }
    }

    /// Number of distinct fingerprints seen.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been indexed yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
