//! The durable record store.
//!
//! The dataset is persisted as whole snapshots: a load reads every row, a
//! save replaces every row. Extraction, merging and filtering only see the
//! [`RecordStore`] trait, so the physical format stays behind this module.

mod csv_store;
mod memory;

use std::path::PathBuf;
use thiserror::Error;

use crate::record::RecordSet;

pub use csv_store::{CsvStore, DEFAULT_STORE_FILE};
pub use memory::MemoryStore;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to access dataset {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed dataset {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Dataset {} has no '{column}' column", path.display())]
    MissingColumn { path: PathBuf, column: &'static str },
}

// ============================================================================
// Store Trait
// ============================================================================

/// Full-snapshot persistence for a record set.
pub trait RecordStore {
    /// Human-readable location for messages ("fundamental.csv").
    fn location(&self) -> String;

    /// Whether a dataset has been saved yet.
    fn exists(&self) -> bool;

    /// Load the whole dataset. `Ok(None)` when nothing has been saved yet.
    fn load(&self) -> Result<Option<RecordSet>, StoreError>;

    /// Replace the whole dataset with `records`.
    fn save(&mut self, records: &RecordSet) -> Result<(), StoreError>;
}
