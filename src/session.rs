//! Per-session state carried across user actions.
//!
//! A [`Session`] holds what the user has done so far in one interactive run:
//! the last extracted workbook, the loaded dataset, the current filtered view
//! and the filter parameters. It is created at startup, owned by the UI, and
//! dropped when the run ends. Every action returns the [`Notice`]s to show.

use chrono::NaiveDate;
use std::path::{Path, PathBuf};

use crate::extract::{extract_file, ExtractConfig, Extraction};
use crate::filter::{filter, FilterCriteria};
use crate::merge::{dedup, merge};
use crate::notice::Notice;
use crate::record::RecordSet;
use crate::store::{RecordStore, StoreError};

const MSG_NO_DATASET: &str =
    "No dataset available. Please load a workbook and consolidate first.";
const MSG_NOTHING_EXTRACTED: &str = "Please load a workbook first.";

/// Merge `new` into `existing` and persist the result as the full snapshot.
pub fn merge_and_save(
    store: &mut dyn RecordStore,
    new: &RecordSet,
    existing: &RecordSet,
) -> Result<RecordSet, StoreError> {
    let merged = merge(new, existing);
    store.save(&merged)?;
    Ok(merged)
}

/// An extraction together with the file it came from.
#[derive(Debug, Clone)]
pub struct LoadedWorkbook {
    pub path: PathBuf,
    pub extraction: Extraction,
}

pub struct Session {
    store: Box<dyn RecordStore>,
    layout: ExtractConfig,
    extracted: Option<LoadedWorkbook>,
    /// Store contents, newest first.
    dataset: Option<RecordSet>,
    /// Stock identifiers present in `dataset`, sorted.
    stocks: Vec<String>,
    view: Option<RecordSet>,
    criteria: FilterCriteria,
}

impl Session {
    pub fn new(store: Box<dyn RecordStore>, layout: ExtractConfig) -> Self {
        Self {
            store,
            layout,
            extracted: None,
            dataset: None,
            stocks: Vec::new(),
            view: None,
            criteria: FilterCriteria::default(),
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn store_location(&self) -> String {
        self.store.location()
    }

    pub fn layout(&self) -> &ExtractConfig {
        &self.layout
    }

    pub fn extracted(&self) -> Option<&LoadedWorkbook> {
        self.extracted.as_ref()
    }

    pub fn dataset(&self) -> Option<&RecordSet> {
        self.dataset.as_ref()
    }

    pub fn stocks(&self) -> &[String] {
        &self.stocks
    }

    pub fn view(&self) -> Option<&RecordSet> {
        self.view.as_ref()
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    // ========================================================================
    // Actions
    // ========================================================================

    /// Read a workbook and keep its records as the pending extraction.
    ///
    /// A workbook that cannot be opened leaves any earlier extraction in
    /// place.
    pub fn extract(&mut self, path: &Path) -> Vec<Notice> {
        let extraction = match extract_file(path, &self.layout) {
            Ok(e) => e,
            Err(e) => return vec![Notice::error(e.to_string())],
        };

        let mut notices: Vec<Notice> = extraction.issues.iter().map(|i| i.to_notice()).collect();
        notices.push(Notice::success(format!(
            "Loaded {} records from {} ({} of {} sheet(s) used).",
            extraction.records.len(),
            path.display(),
            extraction.sheets_used.len(),
            extraction.sheets_used.len() + extraction.issues.len()
        )));

        self.extracted = Some(LoadedWorkbook {
            path: path.to_path_buf(),
            extraction,
        });
        notices
    }

    /// Load the durable dataset for viewing.
    ///
    /// The first successful load seeds the date range with the dataset's
    /// earliest and latest dates; later loads keep whatever the user chose.
    pub fn load_store(&mut self) -> Vec<Notice> {
        match self.store.load() {
            Ok(Some(records)) => {
                let count = records.len();
                self.install_dataset(records);
                vec![Notice::success(format!(
                    "Dataset {} has {} records.",
                    self.store.location(),
                    count
                ))]
            }
            Ok(None) => {
                self.dataset = None;
                self.stocks.clear();
                self.view = None;
                vec![Notice::warning(MSG_NO_DATASET)]
            }
            Err(e) => vec![Notice::error(e.to_string())],
        }
    }

    /// Merge the pending extraction into the store and save it.
    ///
    /// Without a pending extraction this only warns.
    pub fn consolidate(&mut self) -> Vec<Notice> {
        let Some(loaded) = &self.extracted else {
            return vec![Notice::warning(MSG_NOTHING_EXTRACTED)];
        };
        let new = &loaded.extraction.records;

        let existing = match self.store.load() {
            Ok(existing) => existing,
            Err(e) => return vec![Notice::error(e.to_string())],
        };
        let created = existing.is_none();
        let existing = existing.unwrap_or_default();

        let merged = match merge_and_save(self.store.as_mut(), new, &existing) {
            Ok(merged) => merged,
            Err(e) => return vec![Notice::error(e.to_string())],
        };

        let notice = if created {
            Notice::success(format!(
                "Saved new dataset to {} ({} records).",
                self.store.location(),
                merged.len()
            ))
        } else {
            Notice::success(format!(
                "Data consolidated and saved to {} ({} added, {} total).",
                self.store.location(),
                merged.len() - dedup(&existing).len(),
                merged.len()
            ))
        };

        self.install_dataset(merged);
        if self.view.is_some() {
            self.refresh_view();
        }
        vec![notice]
    }

    /// Filter the loaded dataset with the current criteria.
    pub fn apply_filters(&mut self) -> Vec<Notice> {
        let Some(dataset) = &self.dataset else {
            return vec![Notice::error(MSG_NO_DATASET)];
        };
        let total = dataset.len();
        self.refresh_view();
        let shown = self.view.as_ref().map_or(0, RecordSet::len);
        vec![Notice::success(format!("Showing {shown} of {total} records."))]
    }

    // ========================================================================
    // Filter Parameters
    // ========================================================================

    /// Returns whether the stock is selected afterwards.
    pub fn toggle_stock(&mut self, stock: &str) -> bool {
        self.criteria.toggle_stock(stock)
    }

    pub fn clear_stocks(&mut self) {
        self.criteria.stocks.clear();
    }

    pub fn set_start(&mut self, date: Option<NaiveDate>) {
        self.criteria.start = date;
    }

    pub fn set_end(&mut self, date: Option<NaiveDate>) {
        self.criteria.end = date;
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn install_dataset(&mut self, mut records: RecordSet) {
        records.sort_by_date_desc();
        if let Some((lo, hi)) = records.date_bounds() {
            self.criteria.start.get_or_insert(lo);
            self.criteria.end.get_or_insert(hi);
        }
        // Drop selections for stocks that are no longer present
        let stocks = records.stocks();
        self.criteria
            .stocks
            .retain(|s| stocks.binary_search(s).is_ok());
        self.stocks = stocks;
        self.dataset = Some(records);
    }

    fn refresh_view(&mut self) {
        self.view = self
            .dataset
            .as_ref()
            .map(|dataset| filter(dataset, &self.criteria));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notice::Severity;
    use crate::record::NewsRecord;
    use crate::store::MemoryStore;
    use pretty_assertions::assert_eq;

    fn d(m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, day).unwrap()
    }

    fn session_with(records: Option<RecordSet>) -> Session {
        let store = match records {
            Some(r) => MemoryStore::with_records(r),
            None => MemoryStore::new(),
        };
        Session::new(Box::new(store), ExtractConfig::default())
    }

    fn stage(session: &mut Session, rows: Vec<NewsRecord>) {
        session.extracted = Some(LoadedWorkbook {
            path: PathBuf::from("news.xlsx"),
            extraction: Extraction {
                records: RecordSet::from_rows(rows),
                ..Extraction::default()
            },
        });
    }

    #[test]
    fn test_consolidate_without_extraction_warns() {
        let mut session = session_with(None);
        let notices = session.consolidate();
        assert_eq!(notices, vec![Notice::warning(MSG_NOTHING_EXTRACTED)]);
        assert!(session.dataset().is_none());
    }

    #[test]
    fn test_load_missing_store_warns() {
        let mut session = session_with(None);
        let notices = session.load_store();
        assert_eq!(notices[0].severity, Severity::Warning);
        assert!(session.dataset().is_none());
    }

    #[test]
    fn test_filter_without_dataset_is_error() {
        let mut session = session_with(None);
        let notices = session.apply_filters();
        assert!(notices[0].is_error());
        assert!(session.view().is_none());
    }

    #[test]
    fn test_first_consolidate_creates_dataset() {
        let mut session = session_with(None);
        stage(
            &mut session,
            vec![
                NewsRecord::new(d(1, 5), "ABC", "H", "S"),
                NewsRecord::new(d(1, 5), "ABC", "H", "S"),
            ],
        );

        let notices = session.consolidate();
        assert_eq!(notices.len(), 1);
        assert!(notices[0].message.starts_with("Saved new dataset to memory"));
        assert_eq!(session.dataset().map(RecordSet::len), Some(1));
    }

    #[test]
    fn test_consolidate_merges_with_existing() {
        let existing = RecordSet::from_rows(vec![NewsRecord::new(d(1, 5), "ABC", "H", "S")]);
        let mut session = session_with(Some(existing));
        stage(
            &mut session,
            vec![
                NewsRecord::new(d(1, 5), "ABC", "H", "S"),
                NewsRecord::new(d(1, 6), "XYZ", "New", "AP"),
            ],
        );

        let notices = session.consolidate();
        assert!(notices[0].message.contains("1 added, 2 total"));
        let dataset = session.dataset().unwrap();
        assert_eq!(dataset.len(), 2);
        // Newest first
        assert_eq!(dataset.get(0).unwrap().stock, "XYZ");
        assert_eq!(session.stocks(), ["ABC".to_string(), "XYZ".to_string()]);
    }

    #[test]
    fn test_added_count_ignores_duplicates_already_stored() {
        let existing = RecordSet::from_rows(vec![
            NewsRecord::new(d(1, 5), "ABC", "H", "S"),
            NewsRecord::new(d(1, 5), "ABC", "H", "S"),
        ]);
        let mut session = session_with(Some(existing));
        stage(&mut session, vec![NewsRecord::new(d(1, 6), "ABC", "New", "S")]);

        let notices = session.consolidate();
        assert!(
            notices[0].message.contains("(1 added, 2 total)"),
            "{}",
            notices[0].message
        );
    }

    #[test]
    fn test_load_seeds_date_range_once() {
        let existing = RecordSet::from_rows(vec![
            NewsRecord::new(d(1, 5), "ABC", "a", "s"),
            NewsRecord::new(d(3, 1), "ABC", "b", "s"),
        ]);
        let mut session = session_with(Some(existing));
        session.load_store();
        assert_eq!(session.criteria().date_range(), Some((d(1, 5), d(3, 1))));

        session.set_start(Some(d(2, 1)));
        session.load_store();
        assert_eq!(session.criteria().start, Some(d(2, 1)));
    }

    #[test]
    fn test_apply_filters_uses_criteria() {
        let existing = RecordSet::from_rows(vec![
            NewsRecord::new(d(1, 5), "ABC", "a", "s"),
            NewsRecord::new(d(1, 6), "XYZ", "x", "s"),
            NewsRecord::new(d(3, 1), "ABC", "b", "s"),
        ]);
        let mut session = session_with(Some(existing));
        session.load_store();
        session.toggle_stock("ABC");
        session.set_end(Some(d(2, 1)));

        let notices = session.apply_filters();
        assert_eq!(notices[0].message, "Showing 1 of 3 records.");
        let view = session.view().unwrap();
        assert_eq!(view.get(0).unwrap().news, "a");
    }

    #[test]
    fn test_consolidate_refreshes_open_view() {
        let existing = RecordSet::from_rows(vec![NewsRecord::new(d(1, 5), "ABC", "a", "s")]);
        let mut session = session_with(Some(existing));
        session.load_store();
        session.apply_filters();
        assert_eq!(session.view().map(RecordSet::len), Some(1));

        stage(&mut session, vec![NewsRecord::new(d(1, 5), "ABC", "b", "s")]);
        session.consolidate();
        assert_eq!(session.view().map(RecordSet::len), Some(2));
    }

    #[test]
    fn test_extract_missing_file_keeps_previous() {
        let mut session = session_with(None);
        stage(&mut session, vec![NewsRecord::new(d(1, 5), "ABC", "a", "s")]);

        let notices = session.extract(Path::new("/nonexistent/stocknews/missing.xlsx"));
        assert!(notices[0].is_error());
        assert_eq!(
            session
                .extracted()
                .map(|w| w.extraction.records.len()),
            Some(1)
        );
    }

    #[test]
    fn test_merge_and_save_persists() {
        let mut store = MemoryStore::new();
        let new = RecordSet::from_rows(vec![NewsRecord::new(d(1, 5), "ABC", "H", "S")]);
        let merged = merge_and_save(&mut store, &new, &new).unwrap();
        assert_eq!(merged.len(), 1);
        assert_eq!(store.save_count(), 1);
        assert_eq!(store.load().unwrap(), Some(merged));
    }
}
