//! The news record and the record set it lives in.
//!
//! A [`NewsRecord`] is one dated headline attributed to a stock. Dates are
//! held as `NaiveDate` in memory and written in the canonical `YYYY/MM/DD`
//! form wherever they leave the process.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Serialize, Serializer};
use std::collections::BTreeSet;

/// Canonical text form of a record date.
pub const DATE_FORMAT: &str = "%Y/%m/%d";

/// Persisted column order.
pub const COLUMNS: [&str; 4] = ["date", "stock", "news", "source"];

/// One news entry for one stock.
///
/// Field order matches [`COLUMNS`]; the CSV writer relies on it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NewsRecord {
    #[serde(serialize_with = "serialize_date")]
    pub date: NaiveDate,
    pub stock: String,
    pub news: String,
    pub source: String,
}

impl NewsRecord {
    pub fn new(
        date: NaiveDate,
        stock: impl Into<String>,
        news: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            date,
            stock: stock.into(),
            news: news.into(),
            source: source.into(),
        }
    }

    /// The date in canonical `YYYY/MM/DD` form.
    pub fn date_string(&self) -> String {
        format_date(self.date)
    }
}

fn serialize_date<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&date.format(DATE_FORMAT))
}

/// Format a date in canonical `YYYY/MM/DD` form.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parse a stored date.
///
/// Accepts the canonical `YYYY/MM/DD` form plus the dashed ISO form, each
/// optionally followed by a time of day. Older datasets were rewritten with
/// ISO dates after a round trip through a date-typed reader, so both occur in
/// the wild.
pub fn parse_stored_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    for fmt in ["%Y/%m/%d", "%Y-%m-%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Some(date);
        }
    }

    for fmt in [
        "%Y/%m/%d %H:%M:%S",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
    ] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }

    None
}

/// An ordered table of news records sharing the four canonical columns.
///
/// An empty set is still a well-formed table; callers never need to handle an
/// absent result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordSet {
    rows: Vec<NewsRecord>,
}

impl RecordSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: Vec<NewsRecord>) -> Self {
        Self { rows }
    }

    pub fn columns(&self) -> [&'static str; 4] {
        COLUMNS
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&NewsRecord> {
        self.rows.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, NewsRecord> {
        self.rows.iter()
    }

    pub fn rows(&self) -> &[NewsRecord] {
        &self.rows
    }

    pub fn push(&mut self, record: NewsRecord) {
        self.rows.push(record);
    }

    /// Append every row of `other`, preserving order.
    pub fn extend(&mut self, other: RecordSet) {
        self.rows.extend(other.rows);
    }

    pub fn into_rows(self) -> Vec<NewsRecord> {
        self.rows
    }

    /// Sorted, de-duplicated stock identifiers present in the set.
    pub fn stocks(&self) -> Vec<String> {
        self.rows
            .iter()
            .map(|r| r.stock.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Earliest and latest record dates, or `None` for an empty set.
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let mut dates = self.rows.iter().map(|r| r.date);
        let first = dates.next()?;
        Some(dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d))))
    }

    /// Stable sort, newest first. Rows sharing a date keep their relative order.
    pub fn sort_by_date_desc(&mut self) {
        self.rows.sort_by(|a, b| b.date.cmp(&a.date));
    }

    /// Rows as a sorted set, for order-independent comparisons.
    pub fn to_row_set(&self) -> BTreeSet<NewsRecord> {
        self.rows.iter().cloned().collect()
    }
}

impl FromIterator<NewsRecord> for RecordSet {
    fn from_iter<I: IntoIterator<Item = NewsRecord>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for RecordSet {
    type Item = NewsRecord;
    type IntoIter = std::vec::IntoIter<NewsRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

impl<'a> IntoIterator for &'a RecordSet {
    type Item = &'a NewsRecord;
    type IntoIter = std::slice::Iter<'a, NewsRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
