//! Stock news consolidation.
//!
//! Reads stock news out of spreadsheet workbooks (one sheet per stock),
//! merges it into a single CSV dataset without duplicate rows, and filters
//! that dataset by stock and date range. The [`session::Session`] type ties
//! the steps together for one interactive run; the terminal UI in [`ui`]
//! drives it.

pub mod app;
pub mod config;
pub mod extract;
pub mod filter;
pub mod keybindings;
pub mod merge;
pub mod notice;
pub mod record;
pub mod session;
pub mod store;
pub mod ui;
pub mod util;
