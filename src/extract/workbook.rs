//! Workbook reading through calamine.
//!
//! Every sheet is converted into a [`Sheet`] anchored at A1. Sheets the
//! reader cannot parse are reported as [`SheetIssue::Unreadable`].

use calamine::{open_workbook_auto, Data, Range, Reader};
use chrono::{NaiveDate, NaiveDateTime};
use std::path::Path;

use super::cell::{Cell, Sheet};
use super::sheet::SheetIssue;
use super::ExtractError;

/// Sheets read from a workbook file, in workbook order.
#[derive(Debug, Default)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
    /// Sheets the reader could not turn into a cell range.
    pub unreadable: Vec<SheetIssue>,
}

/// Open a workbook (xlsx, xlsm, xls, ods) and read every sheet.
///
/// Failing to open the file is an error; failing to read one sheet is
/// recorded and the remaining sheets are still returned.
pub fn read_workbook(path: &Path) -> Result<Workbook, ExtractError> {
    let mut workbook = open_workbook_auto(path).map_err(|source| ExtractError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let mut result = Workbook::default();
    for name in workbook.sheet_names() {
        match workbook.worksheet_range(&name) {
            Ok(range) => {
                tracing::debug!(
                    sheet = %name,
                    height = range.height(),
                    width = range.width(),
                    "Read sheet"
                );
                result.sheets.push(sheet_from_range(name, &range));
            }
            Err(e) => {
                tracing::warn!(sheet = %name, error = %e, "Failed to read sheet");
                result.unreadable.push(SheetIssue::Unreadable {
                    sheet: name,
                    reason: e.to_string(),
                });
            }
        }
    }

    Ok(result)
}

/// Re-anchor a calamine range at A1.
///
/// Ranges start at the first used cell, but the layout counts rows and
/// columns from the sheet origin, so leading rows and columns are padded.
fn sheet_from_range(name: String, range: &Range<Data>) -> Sheet {
    let Some((start_row, start_col)) = range.start() else {
        return Sheet::new(name, Vec::new());
    };

    let mut rows: Vec<Vec<Cell>> = vec![Vec::new(); start_row as usize];
    for source in range.rows() {
        let mut row = vec![Cell::Empty; start_col as usize];
        row.extend(source.iter().map(cell_from_data));
        rows.push(row);
    }

    Sheet::new(name, rows)
}

fn cell_from_data(data: &Data) -> Cell {
    match data {
        Data::Empty | Data::Error(_) => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(value) => Cell::DateTime(value),
            None => Cell::Number(dt.as_f64()),
        },
        Data::DateTimeIso(s) => parse_iso(s).map_or_else(|| Cell::Text(s.clone()), Cell::DateTime),
        Data::DurationIso(s) => Cell::Text(s.clone()),
    }
}

fn parse_iso(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sheet_from_range_pads_to_origin() {
        let mut range: Range<Data> = Range::new((2, 1), (3, 2));
        range.set_value((2, 1), Data::String("2024/01/05".to_string()));
        range.set_value((3, 2), Data::Float(1.5));

        let sheet = sheet_from_range("ABC".to_string(), &range);
        assert_eq!(sheet.rows.len(), 4);
        assert_eq!(sheet.cell(0, 0), &Cell::Empty);
        assert_eq!(sheet.cell(2, 1), &Cell::from("2024/01/05"));
        assert_eq!(sheet.cell(3, 2), &Cell::Number(1.5));
        assert_eq!(sheet.cell(3, 1), &Cell::Empty);
    }

    #[test]
    fn test_empty_range() {
        let range: Range<Data> = Range::empty();
        let sheet = sheet_from_range("EMPTY".to_string(), &range);
        assert!(sheet.rows.is_empty());
    }

    #[test]
    fn test_cell_conversion() {
        assert_eq!(cell_from_data(&Data::Int(7)), Cell::Number(7.0));
        assert_eq!(cell_from_data(&Data::Bool(true)), Cell::Bool(true));
        assert_eq!(
            cell_from_data(&Data::Error(calamine::CellErrorType::NA)),
            Cell::Empty
        );
        let iso = cell_from_data(&Data::DateTimeIso("2024-01-05T08:00:00".to_string()));
        assert!(matches!(iso, Cell::DateTime(dt) if dt.date() == NaiveDate::from_ymd_opt(2024, 1, 5).unwrap()));
    }

    #[test]
    fn test_missing_file_is_open_error() {
        let err = read_workbook(Path::new("/nonexistent/stocknews/news.xlsx")).unwrap_err();
        assert!(matches!(err, ExtractError::Open { .. }));
    }
}
