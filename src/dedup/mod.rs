//! First-seen-wins deduplication.
//!
//! The [`Deduplicator`] walks a tree, fingerprints every regular file and
//! deletes each file whose content was already seen earlier in traversal
//! order. The [`SeenIndex`] maps fingerprints to the surviving path, and
//! [`RunResult`] accumulates what happened.

pub mod driver;
pub mod index;
pub mod result;

pub use driver::{DedupConfig, DedupError, Deduplicator, DEFAULT_BATCH_SIZE};
pub use index::{Lookup, SeenIndex};
pub use result::{DuplicatePair, FailureKind, FileFailure, RunResult};
