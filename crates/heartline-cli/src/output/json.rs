//! JSON output for plays, history, and stats.

use serde_json::{json, Value};

use heartline_core::{PlayRecord, PlayResult, SyncReport};

/// Convert a play result to JSON, adding the verdict text.
pub fn play_json(result: &PlayResult) -> anyhow::Result<Value> {
    let mut value = serde_json::to_value(result)?;
    if let Some(map) = value.as_object_mut() {
        map.insert("percentage".to_string(), json!(result.percentage()));
        map.insert("message".to_string(), json!(result.verdict.message()));
    }
    Ok(value)
}

/// Convert this device's history to JSON.
pub fn history_json(device_id: &str, records: &[PlayRecord]) -> Value {
    json!({
        "deviceId": device_id,
        "count": records.len(),
        "plays": records,
    })
}

/// Convert a statistics report to JSON.
pub fn stats_json(report: &SyncReport) -> anyhow::Result<Value> {
    Ok(serde_json::to_value(report)?)
}
