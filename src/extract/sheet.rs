//! Per-sheet normalization into news records.

use serde::Deserialize;
use std::fmt;

use super::cell::{Cell, Sheet};
use super::date::coerce_date;
use crate::notice::Notice;
use crate::record::{NewsRecord, RecordSet};

/// Number of data columns a sheet carries: date, source, news.
pub const DATA_COLUMNS: usize = 3;

/// Fixed layout of an incoming news sheet.
///
/// Columns are 1-indexed and inclusive, as a spreadsheet user would count
/// them. The defaults describe the standard export: a six-row metadata block,
/// then date, source and news in columns B through D.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// Rows at the top of each sheet that never hold records.
    pub header_rows: usize,
    /// Column holding the date (1-indexed).
    pub first_column: usize,
    /// Column holding the news text (1-indexed).
    pub last_column: usize,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            header_rows: 6,
            first_column: 2,
            last_column: 4,
        }
    }
}

impl ExtractConfig {
    /// Check that the column range addresses exactly the three data columns.
    pub fn validate(&self) -> Result<(), String> {
        if self.first_column == 0 {
            return Err("first_column is 1-indexed and must be at least 1".to_string());
        }
        if self.last_column < self.first_column
            || self.last_column - self.first_column + 1 != DATA_COLUMNS
        {
            return Err(format!(
                "columns {}..={} must span exactly {} columns (date, source, news)",
                self.first_column, self.last_column, DATA_COLUMNS
            ));
        }
        Ok(())
    }

    fn first_index(&self) -> usize {
        self.first_column.saturating_sub(1)
    }
}

/// A per-sheet problem found during extraction. The sheet is skipped; the
/// rest of the workbook is still processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetIssue {
    /// The data block does not span exactly the expected columns.
    UnexpectedShape {
        sheet: String,
        columns: usize,
        expected: usize,
    },
    /// Nothing but empty rows below the header block.
    Empty { sheet: String },
    /// The reader could not produce a cell range for the sheet.
    Unreadable { sheet: String, reason: String },
}

impl SheetIssue {
    pub fn sheet(&self) -> &str {
        match self {
            Self::UnexpectedShape { sheet, .. }
            | Self::Empty { sheet }
            | Self::Unreadable { sheet, .. } => sheet,
        }
    }

    /// Shape and read failures are errors; an empty sheet is only a warning.
    pub fn to_notice(&self) -> Notice {
        match self {
            Self::Empty { .. } => Notice::warning(self.to_string()),
            Self::UnexpectedShape { .. } | Self::Unreadable { .. } => {
                Notice::error(self.to_string())
            }
        }
    }
}

impl fmt::Display for SheetIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedShape {
                sheet,
                columns,
                expected,
            } => write!(
                f,
                "Sheet {sheet} does not have the expected format ({columns} data columns, expected {expected})."
            ),
            Self::Empty { sheet } => write!(f, "Sheet {sheet} is empty and has been skipped."),
            Self::Unreadable { sheet, reason } => {
                write!(f, "Sheet {sheet} could not be read: {reason}")
            }
        }
    }
}

/// Normalize one sheet into records tagged with the sheet name as stock.
pub fn normalize_sheet(sheet: &Sheet, config: &ExtractConfig) -> Result<RecordSet, SheetIssue> {
    let first = config.first_index();
    let data_rows = sheet.rows.get(config.header_rows..).unwrap_or_default();

    let last_used = data_rows
        .iter()
        .filter_map(|row| row.iter().rposition(|c| !c.is_empty()))
        .max();

    let Some(last_used) = last_used else {
        return Err(SheetIssue::Empty {
            sheet: sheet.name.clone(),
        });
    };

    let columns = if last_used >= first {
        last_used + 1 - first
    } else {
        0
    };
    if columns != DATA_COLUMNS {
        return Err(SheetIssue::UnexpectedShape {
            sheet: sheet.name.clone(),
            columns,
            expected: DATA_COLUMNS,
        });
    }

    let populated: Vec<[&Cell; 3]> = (config.header_rows..sheet.rows.len())
        .map(|r| {
            [
                sheet.cell(r, first),
                sheet.cell(r, first + 1),
                sheet.cell(r, first + 2),
            ]
        })
        .filter(|cells| !cells.iter().all(|c| c.is_empty()))
        .collect();

    if populated.is_empty() {
        return Err(SheetIssue::Empty {
            sheet: sheet.name.clone(),
        });
    }

    let total = populated.len();
    let records: RecordSet = populated
        .into_iter()
        .filter_map(|[date, source, news]| {
            let date = coerce_date(date)?;
            Some(NewsRecord::new(
                date,
                sheet.name.as_str(),
                news.to_text(),
                source.to_text(),
            ))
        })
        .collect();

    if records.len() < total {
        tracing::debug!(
            sheet = %sheet.name,
            dropped = total - records.len(),
            "Dropped rows without a readable date"
        );
    }

    Ok(records)
}
