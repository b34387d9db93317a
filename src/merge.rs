//! Consolidation of freshly extracted records into an existing record set.

use std::collections::HashSet;

use crate::record::{NewsRecord, RecordSet};

/// Union of `existing` and `new` with exact duplicates removed.
///
/// Existing rows come first, then new rows; the first occurrence of each
/// distinct row is kept. Rows are compared on all four fields with no
/// normalization, so a change in case or whitespace makes a distinct row.
pub fn merge(new: &RecordSet, existing: &RecordSet) -> RecordSet {
    let mut seen: HashSet<&NewsRecord> = HashSet::with_capacity(existing.len() + new.len());

    let merged: RecordSet = existing
        .iter()
        .chain(new.iter())
        .filter(|record| seen.insert(*record))
        .cloned()
        .collect();

    tracing::debug!(
        existing = existing.len(),
        new = new.len(),
        merged = merged.len(),
        "Merged record sets"
    );
    merged
}

/// Remove exact duplicate rows from a single set, keeping first occurrences.
pub fn dedup(records: &RecordSet) -> RecordSet {
    merge(&RecordSet::new(), records)
}
