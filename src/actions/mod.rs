//! File actions module.
//!
//! Deletion is the only action: a duplicate is either removed permanently or,
//! in dry-run mode, left in place and reported.
//!
//! ```no_run
//! use dupsweep::actions::{delete_file, DeleteMode};
//! use std::path::Path;
//!
//! let result = delete_file(Path::new("/path/to/duplicate.txt"), DeleteMode::DryRun);
//! ```

pub mod delete;

// Re-export commonly used types
pub use delete::{
    delete_file, file_size, permanent_delete, DeleteError, DeleteMode, DeleteResult,
};
