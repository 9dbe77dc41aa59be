//! Storage module for the persisted dataset
//!
//! This module owns the collection of records that outlives a single
//! collection cycle, including:
//! - The in-memory dataset keyed by record id
//! - Merge-by-key with last-write-wins conflict resolution
//! - Atomic snapshot persistence (full rewrite, tmp file + rename)

mod dataset;
mod snapshot;

pub use dataset::{Dataset, MergeStats};
pub use snapshot::{load_dataset, persist_dataset};

use crate::record::RecordError;
use thiserror::Error;

/// Errors that can occur during snapshot operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Snapshot header mismatch: found '{0}'")]
    Header(String),

    #[error("Snapshot line {line}: {source}")]
    Row { line: usize, source: RecordError },
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
