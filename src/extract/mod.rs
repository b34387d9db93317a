//! Workbook extraction: spreadsheet sheets in, normalized news records out.
//!
//! - **Reading**: [`workbook`] opens the file with `calamine` and re-anchors
//!   every sheet at A1 as a grid of [`Cell`]s
//! - **Normalizing**: [`sheet`] applies the fixed [`ExtractConfig`] layout to
//!   each sheet, reporting malformed and empty sheets as [`SheetIssue`]s
//! - **Date coercion**: [`date`] turns date cells into calendar dates or
//!   nothing
//!
//! # Example
//!
//! ```ignore
//! use stocknews::extract::{extract_file, ExtractConfig};
//!
//! let extraction = extract_file(Path::new("news.xlsx"), &ExtractConfig::default())?;
//! for issue in &extraction.issues {
//!     eprintln!("{issue}");
//! }
//! ```

mod cell;
mod date;
mod sheet;
mod workbook;

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::record::RecordSet;

pub use cell::{Cell, Sheet};
pub use date::{coerce_date, excel_serial_to_date, parse_date_text};
pub use sheet::{normalize_sheet, ExtractConfig, SheetIssue, DATA_COLUMNS};
pub use workbook::{read_workbook, Workbook};

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Failed to open workbook {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },
}

/// Result of extracting one workbook.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    /// Records from every surviving sheet, in sheet order.
    pub records: RecordSet,
    /// One entry per skipped sheet.
    pub issues: Vec<SheetIssue>,
    /// Names of the sheets that contributed records.
    pub sheets_used: Vec<String>,
}

/// Normalize a set of sheets and concatenate the survivors.
pub fn extract_sheets(sheets: &[Sheet], config: &ExtractConfig) -> Extraction {
    let mut extraction = Extraction::default();

    for sheet in sheets {
        match normalize_sheet(sheet, config) {
            Ok(records) => {
                tracing::debug!(sheet = %sheet.name, records = records.len(), "Normalized sheet");
                extraction.sheets_used.push(sheet.name.clone());
                extraction.records.extend(records);
            }
            Err(issue) => {
                tracing::warn!(sheet = %sheet.name, issue = %issue, "Skipped sheet");
                extraction.issues.push(issue);
            }
        }
    }

    extraction
}

/// Read a workbook from disk and extract its records.
pub fn extract_file(path: &Path, config: &ExtractConfig) -> Result<Extraction, ExtractError> {
    let workbook = read_workbook(path)?;
    let mut extraction = extract_sheets(&workbook.sheets, config);
    extraction.issues.extend(workbook.unreadable);

    tracing::info!(
        path = %path.display(),
        records = extraction.records.len(),
        sheets = extraction.sheets_used.len(),
        skipped = extraction.issues.len(),
        "Extracted workbook"
    );
    Ok(extraction)
}
