//! Text helpers for rendering spreadsheet text in a terminal.
//!
//! Headlines come straight from user workbooks, so before they reach a table
//! cell they are stripped of control sequences, flattened to one line and
//! truncated by display width (CJK and emoji count double).
//!
//! ```
//! use stocknews::util::{display_width, fit_cell};
//!
//! assert_eq!(display_width("Hello"), 5);
//! assert_eq!(fit_cell("Quarterly\nresults beat estimates", 20), "Quarterly results...");
//! ```

mod text;

pub use text::{display_width, fit_cell, single_line, strip_control_chars, truncate_to_width};
