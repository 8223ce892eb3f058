//! UI primitives for the Heartline CLI.
//!
//! This module provides:
//! - **Context**: Environment detection (TTY, width, color, unicode)
//! - **Mode**: Output mode resolution (json, plain, pretty)
//! - **Theme**: Badge tokens, owo-colors styles, symbols
//! - **Render**: Tables, headers, receipts, hints, score cards
//! - **Progress**: Spinner for shared ledger round trips
//! - **Format**: String utilities (truncate, timestamps, bars)
//!
//! # Usage
//!
//! ```ignore
//! use crate::ui::{header, hint, print, UiContext};
//!
//! let ui = UiContext::from_env(args.json, args.format.as_deref(), cli.no_color, cli.ascii);
//!
//! if ui.mode.is_json() {
//!     // Handle JSON output separately
//!     return Ok(());
//! }
//!
//! print(&ui, &header(&ui, "history", None));
//! print(&ui, &hint(&ui, "heartline play Alice Bob"));
//! ```

mod context;
pub mod format;
mod mode;
pub mod progress;
pub mod render;
pub mod theme;

// Re-export core types at module level
pub use context::UiContext;
pub use mode::OutputMode;
pub use theme::Badge;

// Re-export commonly used render functions
pub use render::{
    badge, blank_line, header, hint, kv, print, print_error, receipt, score_card, simple_table,
    Column,
};

pub use progress::Spinner;

pub use format::{format_datetime, percent_bar, single_line, truncate};
