//! Terminal User Interface module.
//!
//! # Module Structure
//!
//! - `loop_runner` - Main event loop and terminal management
//! - `input` - Keyboard input handling
//! - `render` - View rendering dispatch and overlays
//! - `stocks` - Stock picker and filter summary
//! - `records` - Record table widget
//! - `import` - Workbook import and consolidation view
//! - `status` - Status bar widget
//! - `help` - Keybinding help overlay

mod help;
mod import;
mod input;
mod loop_runner;
mod records;
mod render;
mod status;
mod stocks;

pub use loop_runner::{run, Action};
