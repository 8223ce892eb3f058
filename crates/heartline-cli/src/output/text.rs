//! Text and table output for plays, history, and stats.

use chrono_tz::Tz;

use heartline_core::{PlayRecord, StatsSource, SyncReport};

use crate::ui::{format_datetime, percent_bar, single_line, truncate, Column, UiContext};

pub const HISTORY_COLUMNS: [Column; 4] = [
    Column::new("When"),
    Column::new("Names"),
    Column::new("Score"),
    Column::new(""),
];

const NAME_WIDTH: usize = 24;

/// One table row per play, most recent first.
pub fn history_rows(ctx: &UiContext, records: &[PlayRecord], tz: Option<Tz>) -> Vec<Vec<String>> {
    let pretty = ctx.mode.is_pretty();
    records
        .iter()
        .map(|record| {
            let names = if pretty {
                truncate(
                    &format!(
                        "{} + {}",
                        single_line(&record.first_name),
                        single_line(&record.second_name)
                    ),
                    NAME_WIDTH,
                )
            } else {
                // plain rows stay one token per column
                format!(
                    "{}+{}",
                    record.first_name.replace(char::is_whitespace, "_"),
                    record.second_name.replace(char::is_whitespace, "_")
                )
            };
            let bar = if pretty {
                percent_bar(record.percentage, 10, ctx.unicode)
            } else {
                String::new()
            };
            let mut row = vec![
                format_datetime(&record.created_at, tz, pretty),
                names,
                format!("{}%", record.percentage),
            ];
            if pretty {
                row.push(bar);
            }
            row
        })
        .collect()
}

/// Short description of where statistics came from.
pub fn source_label(report: &SyncReport) -> String {
    match &report.source {
        StatsSource::Shared { .. } => "shared".to_string(),
        StatsSource::LocalOnly { reason } => format!("local only ({})", reason.describe()),
    }
}

/// Key-value pairs describing a statistics report.
pub fn stats_items(report: &SyncReport) -> Vec<(&'static str, String)> {
    let mut items = vec![
        ("Total plays", report.stats.total_plays.to_string()),
        ("Unique devices", report.stats.unique_devices.to_string()),
        ("Source", source_label(report)),
    ];
    if let StatsSource::Shared {
        version: Some(version),
    } = &report.source
    {
        items.push(("Version", truncate(version.as_str(), 12)));
    }
    items
}
