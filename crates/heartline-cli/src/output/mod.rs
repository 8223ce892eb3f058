//! Output formatting helpers for the CLI.
//!
//! This module provides formatting utilities for displaying plays and
//! statistics in JSON and text form.

mod json;
mod text;

// Re-export public API
pub use json::{history_json, play_json, stats_json};
pub use text::{history_rows, source_label, stats_items, HISTORY_COLUMNS};
