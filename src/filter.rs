//! Stock and date-range filtering of a record set.

use chrono::NaiveDate;
use std::collections::BTreeSet;

use crate::record::{NewsRecord, RecordSet};

/// Filter parameters chosen by the user.
///
/// An empty stock selection lets every stock through. The date range only
/// applies when both bounds are set; it is inclusive on both ends.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub stocks: BTreeSet<String>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stocks<I, S>(mut self, stocks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stocks = stocks.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_range(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.start = start;
        self.end = end;
        self
    }

    /// Add the stock to the selection, or remove it if already selected.
    /// Returns whether the stock is selected afterwards.
    pub fn toggle_stock(&mut self, stock: &str) -> bool {
        if self.stocks.remove(stock) {
            false
        } else {
            self.stocks.insert(stock.to_string());
            true
        }
    }

    pub fn is_selected(&self, stock: &str) -> bool {
        self.stocks.contains(stock)
    }

    /// The active date range, if both bounds are present.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        self.start.zip(self.end)
    }

    pub fn matches(&self, record: &NewsRecord) -> bool {
        if !self.stocks.is_empty() && !self.stocks.contains(&record.stock) {
            return false;
        }
        match self.date_range() {
            Some((start, end)) => start <= record.date && record.date <= end,
            None => true,
        }
    }
}

/// Rows of `records` matching `criteria`, in input order.
pub fn filter(records: &RecordSet, criteria: &FilterCriteria) -> RecordSet {
    records
        .iter()
        .filter(|r| criteria.matches(r))
        .cloned()
        .collect()
}
