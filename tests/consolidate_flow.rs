//! Integration tests for the consolidate-then-view flow.
//!
//! Each test runs a [`Session`] over a CSV dataset in its own temp
//! directory, extracting `fixtures/news.xlsx` the way the import view does.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use stocknews::extract::ExtractConfig;
use stocknews::notice::Severity;
use stocknews::record::{NewsRecord, RecordSet};
use stocknews::session::{merge_and_save, Session};
use stocknews::store::{CsvStore, MemoryStore, RecordStore};

fn fixture() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/news.xlsx")
}

fn d(m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, m, day).unwrap()
}

fn csv_session(path: &Path) -> Session {
    Session::new(Box::new(CsvStore::new(path)), ExtractConfig::default())
}

// ============================================================================
// Extract + Consolidate
// ============================================================================

#[test]
fn test_extract_reports_issues_then_summary() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = csv_session(&dir.path().join("fundamental.csv"));

    let notices = session.extract(&fixture());
    let severities: Vec<Severity> = notices.iter().map(|n| n.severity).collect();
    assert_eq!(
        severities,
        vec![Severity::Error, Severity::Warning, Severity::Success]
    );
    assert!(notices[2].message.starts_with("Loaded 3 records from"));
    assert!(notices[2].message.ends_with("(1 of 3 sheet(s) used)."));
    assert_eq!(session.extracted().map(|w| w.extraction.records.len()), Some(3));
}

#[test]
fn test_first_consolidate_writes_csv() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fundamental.csv");
    let mut session = csv_session(&path);

    session.extract(&fixture());
    let notices = session.consolidate();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].severity, Severity::Success);
    assert!(notices[0].message.starts_with("Saved new dataset to"));

    let text = std::fs::read_to_string(&path).unwrap();
    assert_eq!(
        text,
        "date,stock,news,source\n\
         2024/01/05,ABC,ABC beats estimates,Reuters\n\
         2024/01/08,ABC,ABC raises guidance,Bloomberg\n\
         2024/01/08,ABC,ABC names new CFO,Reuters\n"
    );
}

#[test]
fn test_repeat_consolidate_adds_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fundamental.csv");
    let mut session = csv_session(&path);

    session.extract(&fixture());
    session.consolidate();
    let notices = session.consolidate();
    assert!(notices[0].message.contains("(0 added, 3 total)"));

    let reloaded = CsvStore::new(&path).load().unwrap().unwrap();
    assert_eq!(reloaded.len(), 3);
}

#[test]
fn test_consolidate_merges_into_legacy_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fundamental.csv");
    std::fs::write(
        &path,
        "Date,Stock,News,Source\n\
         2024-01-05,ABC,ABC beats estimates,Reuters\n\
         2023-12-29,XYZ,XYZ year end update,AP\n",
    )
    .unwrap();
    let mut session = csv_session(&path);

    session.extract(&fixture());
    let notices = session.consolidate();
    assert!(notices[0].message.contains("(2 added, 4 total)"));

    let text = std::fs::read_to_string(&path).unwrap();
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("date,stock,news,source"));
    // Existing rows keep their position ahead of new ones
    assert_eq!(lines.next(), Some("2024/01/05,ABC,ABC beats estimates,Reuters"));
    assert_eq!(lines.next(), Some("2023/12/29,XYZ,XYZ year end update,AP"));
    assert_eq!(lines.count(), 2);

    assert_eq!(session.stocks(), ["ABC".to_string(), "XYZ".to_string()]);
}

// ============================================================================
// View + Filter
// ============================================================================

#[test]
fn test_fresh_session_views_saved_dataset() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fundamental.csv");
    {
        let mut session = csv_session(&path);
        session.extract(&fixture());
        session.consolidate();
    }

    let mut session = csv_session(&path);
    let notices = session.load_store();
    assert_eq!(notices[0].severity, Severity::Success);
    assert!(notices[0].message.ends_with("has 3 records."));
    assert_eq!(session.stocks(), ["ABC".to_string()]);
    assert_eq!(session.criteria().date_range(), Some((d(1, 5), d(1, 8))));

    // Newest first
    let dates: Vec<NaiveDate> = session.dataset().unwrap().iter().map(|r| r.date).collect();
    assert_eq!(dates, vec![d(1, 8), d(1, 8), d(1, 5)]);

    session.toggle_stock("ABC");
    session.set_start(Some(d(1, 6)));
    let notices = session.apply_filters();
    assert_eq!(notices[0].message, "Showing 2 of 3 records.");
    assert!(session.view().unwrap().iter().all(|r| r.date == d(1, 8)));
}

#[test]
fn test_filter_with_no_stock_selected_keeps_all_stocks() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fundamental.csv");
    let mut session = csv_session(&path);
    session.extract(&fixture());
    session.consolidate();

    session.apply_filters();
    assert_eq!(session.view().map(RecordSet::len), Some(3));

    session.set_start(Some(d(1, 9)));
    session.apply_filters();
    assert_eq!(session.view().map(RecordSet::len), Some(0));
}

#[test]
fn test_view_without_dataset_warns() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = csv_session(&dir.path().join("fundamental.csv"));

    let notices = session.load_store();
    assert_eq!(notices[0].severity, Severity::Warning);
    assert_eq!(
        notices[0].message,
        "No dataset available. Please load a workbook and consolidate first."
    );
    assert!(session.apply_filters()[0].is_error());
}

// ============================================================================
// merge_and_save
// ============================================================================

#[test]
fn test_merge_and_save_persists_union() {
    let mut store = MemoryStore::new();
    let existing = RecordSet::from_rows(vec![NewsRecord::new(d(1, 5), "ABC", "H", "S")]);
    let new = RecordSet::from_rows(vec![
        NewsRecord::new(d(1, 5), "ABC", "H", "S"),
        NewsRecord::new(d(1, 5), "ABC", "H", "S2"),
    ]);

    let merged = merge_and_save(&mut store, &new, &existing).unwrap();
    assert_eq!(merged.len(), 2);
    assert_eq!(store.load().unwrap(), Some(merged));
    assert_eq!(store.save_count(), 1);
}
