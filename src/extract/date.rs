//! Lenient date coercion for the date column.
//!
//! Anything that cannot be read as a calendar date becomes `None`; the row is
//! then dropped by the normalizer. Nothing here returns an error.

use chrono::{Duration, NaiveDate, NaiveTime};

use super::cell::Cell;

/// Last serial day representable in the 1900 date system (9999-12-31).
const MAX_EXCEL_SERIAL: f64 = 2_958_465.0;

const DATE_FORMATS: [&str; 8] = [
    "%Y/%m/%d",
    "%Y-%m-%d",
    "%Y.%m.%d",
    "%m/%d/%Y",
    "%d %b %Y",
    "%d %B %Y",
    "%b %d, %Y",
    "%B %d, %Y",
];

/// Time of day that may follow any date form, after a space or `T`.
const TIME_FORMATS: [&str; 3] = ["%H:%M:%S", "%H:%M:%S%.f", "%H:%M"];

/// Coerce a cell into a calendar date.
pub fn coerce_date(cell: &Cell) -> Option<NaiveDate> {
    match cell {
        Cell::DateTime(dt) => Some(dt.date()),
        Cell::Number(serial) => excel_serial_to_date(*serial),
        Cell::Text(s) => parse_date_text(s),
        Cell::Empty | Cell::Bool(_) => None,
    }
}

/// Parse free-form date text using the accepted formats, optionally
/// followed by a time of day which is discarded.
pub fn parse_date_text(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    parse_date_only(s).or_else(|| {
        let split = s.rfind(|c: char| c == ' ' || c == 'T')?;
        let (date, time) = (s[..split].trim_end(), &s[split + 1..]);
        TIME_FORMATS
            .iter()
            .any(|fmt| NaiveTime::parse_from_str(time, fmt).is_ok())
            .then(|| parse_date_only(date))
            .flatten()
    })
}

fn parse_date_only(s: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .or_else(|| parse_compact(s))
}

/// `YYYYMMDD` with no separators. chrono's `%Y` is greedy, so the digits
/// are split by position.
fn parse_compact(s: &str) -> Option<NaiveDate> {
    if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDate::from_ymd_opt(
        s[..4].parse().ok()?,
        s[4..6].parse().ok()?,
        s[6..].parse().ok()?,
    )
}

/// Convert a 1900-system serial day number to a date.
///
/// Serials below 61 sit before the phantom 1900-02-29 that spreadsheet
/// applications count, so they are shifted by one day.
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || !(1.0..=MAX_EXCEL_SERIAL).contains(&serial) {
        return None;
    }

    let days = serial.floor() as i64;
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    let days = if days < 61 { days + 1 } else { days };
    epoch.checked_add_signed(Duration::days(days))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_text_formats() {
        let cases = [
            ("2024/01/05", d(2024, 1, 5)),
            ("2024-01-05", d(2024, 1, 5)),
            ("2024.01.05", d(2024, 1, 5)),
            ("01/05/2024", d(2024, 1, 5)),
            ("5 Jan 2024", d(2024, 1, 5)),
            ("5 January 2024", d(2024, 1, 5)),
            ("Jan 5, 2024", d(2024, 1, 5)),
            ("2024-01-05 13:45:00", d(2024, 1, 5)),
            ("2024-01-05T13:45:00", d(2024, 1, 5)),
            ("2024-01-05 13:45:00.250", d(2024, 1, 5)),
            ("  2024/01/05  ", d(2024, 1, 5)),
            ("20240105", d(2024, 1, 5)),
            ("20240105 09:30", d(2024, 1, 5)),
            ("2024/01/05 09:30", d(2024, 1, 5)),
            ("2024.01.05 10:00", d(2024, 1, 5)),
            ("01/05/2024 10:00:30", d(2024, 1, 5)),
            ("5 Jan 2024 10:00", d(2024, 1, 5)),
            ("5 January 2024 10:00:00", d(2024, 1, 5)),
            ("Jan 5, 2024 10:00", d(2024, 1, 5)),
            ("January 5, 2024 23:59:59", d(2024, 1, 5)),
        ];
        for (input, expected) in cases {
            assert_eq!(parse_date_text(input), Some(expected), "input: {input}");
        }
    }

    #[test]
    fn test_unparseable_text_is_missing() {
        assert_eq!(parse_date_text("invalid-date"), None);
        assert_eq!(parse_date_text("Date"), None);
        assert_eq!(parse_date_text(""), None);
        assert_eq!(parse_date_text("2024/02/30"), None);
        assert_eq!(parse_date_text("20240230"), None);
        assert_eq!(parse_date_text("2024010"), None);
        assert_eq!(parse_date_text("2024/01/05 noon"), None);
        assert_eq!(parse_date_text("2024/01/05 25:00"), None);
    }

    #[test]
    fn test_excel_serial() {
        assert_eq!(excel_serial_to_date(45296.0), Some(d(2024, 1, 5)));
        // Time-of-day fraction is discarded
        assert_eq!(excel_serial_to_date(45296.75), Some(d(2024, 1, 5)));
        assert_eq!(excel_serial_to_date(1.0), Some(d(1900, 1, 1)));
        assert_eq!(excel_serial_to_date(61.0), Some(d(1900, 3, 1)));
    }

    #[test]
    fn test_excel_serial_out_of_range() {
        assert_eq!(excel_serial_to_date(0.0), None);
        assert_eq!(excel_serial_to_date(-3.0), None);
        assert_eq!(excel_serial_to_date(f64::NAN), None);
        assert_eq!(excel_serial_to_date(MAX_EXCEL_SERIAL + 1.0), None);
    }

    #[test]
    fn test_coerce_cells() {
        let dt = d(2024, 1, 5).and_hms_opt(9, 30, 0).unwrap();
        assert_eq!(coerce_date(&Cell::DateTime(dt)), Some(d(2024, 1, 5)));
        assert_eq!(coerce_date(&Cell::Number(45296.0)), Some(d(2024, 1, 5)));
        assert_eq!(coerce_date(&Cell::from("2024/01/05")), Some(d(2024, 1, 5)));
        assert_eq!(coerce_date(&Cell::Empty), None);
        assert_eq!(coerce_date(&Cell::Bool(true)), None);
    }
}
