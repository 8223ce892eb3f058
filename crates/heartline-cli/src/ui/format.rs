//! String formatting utilities for UI rendering.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

/// Truncate a string to max length, adding ellipsis if needed.
pub fn truncate(s: &str, max_len: usize) -> String {
    let char_count = s.chars().count();
    if char_count <= max_len {
        return s.to_string();
    }
    if max_len <= 3 {
        return s.chars().take(max_len).collect();
    }
    let truncated: String = s.chars().take(max_len - 3).collect();
    format!("{}...", truncated)
}

/// Format a timestamp for display.
///
/// Pretty output uses the configured timezone (UTC otherwise); plain output
/// is always RFC 3339 in UTC with milliseconds.
pub fn format_datetime(dt: &DateTime<Utc>, tz: Option<Tz>, pretty: bool) -> String {
    if !pretty {
        return dt.to_rfc3339_opts(chrono::SecondsFormat::Millis, true);
    }
    match tz {
        Some(tz) => dt.with_timezone(&tz).format("%Y-%m-%d %H:%M %Z").to_string(),
        None => dt.format("%Y-%m-%d %H:%M UTC").to_string(),
    }
}

/// Collapse whitespace so a value fits on one line.
pub fn single_line(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Render a 0..=100 percentage as a fixed-width bar.
pub fn percent_bar(percentage: u8, width: usize, unicode: bool) -> String {
    let filled = (usize::from(percentage.min(100)) * width + 50) / 100;
    let (on, off) = if unicode { ("\u{2588}", "\u{2591}") } else { ("#", ".") };
    format!("{}{}", on.repeat(filled), off.repeat(width - filled))
}
