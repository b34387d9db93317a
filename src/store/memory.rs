use super::{RecordStore, StoreError};
use crate::record::RecordSet;

/// Store that keeps the snapshot in memory for the life of the process.
///
/// Used for dry runs and tests; nothing survives a restart.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    snapshot: Option<RecordSet>,
    saves: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `records`.
    pub fn with_records(records: RecordSet) -> Self {
        Self {
            snapshot: Some(records),
            saves: 0,
        }
    }

    /// Number of snapshots written so far.
    pub fn save_count(&self) -> usize {
        self.saves
    }
}

impl RecordStore for MemoryStore {
    fn location(&self) -> String {
        "memory".to_string()
    }

    fn exists(&self) -> bool {
        self.snapshot.is_some()
    }

    fn load(&self) -> Result<Option<RecordSet>, StoreError> {
        Ok(self.snapshot.clone())
    }

    fn save(&mut self, records: &RecordSet) -> Result<(), StoreError> {
        self.snapshot = Some(records.clone());
        self.saves += 1;
        Ok(())
    }
}
