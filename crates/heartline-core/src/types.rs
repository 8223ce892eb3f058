//! Core data types shared by the local cache and the shared ledger.
//!
//! Field names on the wire follow the shared `plays.json` document format
//! (`name1`, `name2`, `deviceId`, `timestamp`, ...), so ledgers written by
//! other clients deserialize and re-serialize without changes.

use std::collections::HashSet;

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Maximum number of records kept in the local history.
pub const HISTORY_LIMIT: usize = 10;

/// Stable per-installation identifier.
pub type DeviceId = String;

/// A single completed play. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayRecord {
    #[serde(rename = "name1")]
    pub first_name: String,

    #[serde(rename = "name2")]
    pub second_name: String,

    /// Compatibility score, 0-100
    pub percentage: u8,

    #[serde(rename = "deviceId")]
    pub device_id: DeviceId,

    /// Creation time, millisecond precision
    #[serde(rename = "timestamp", with = "millis_timestamp")]
    pub created_at: DateTime<Utc>,

    /// Human-readable creation time, carried for display only
    #[serde(rename = "date", default, skip_serializing_if = "Option::is_none")]
    pub display_date: Option<String>,

    /// Fields written by other clients, kept so rewrites do not drop them
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PlayRecord {
    pub fn new(
        first_name: impl Into<String>,
        second_name: impl Into<String>,
        percentage: u8,
        device_id: impl Into<DeviceId>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            second_name: second_name.into(),
            percentage: percentage.min(100),
            device_id: device_id.into(),
            created_at: Utc::now().trunc_subsecs(3),
            display_date: None,
            extra: Map::new(),
        }
        .with_display_date()
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at.trunc_subsecs(3);
        self.with_display_date()
    }

    fn with_display_date(mut self) -> Self {
        self.display_date = Some(
            self.created_at
                .format("%-m/%-d/%Y, %-I:%M:%S %p")
                .to_string(),
        );
        self
    }

    /// Content hash identifying this play across retried submissions.
    ///
    /// Two records with the same device, timestamp, names and score are the
    /// same play. The display date is excluded.
    pub fn fingerprint(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.device_id.as_bytes());
        hasher.update(b"\0");
        hasher.update(self.created_at.timestamp_millis().to_le_bytes().as_slice());
        hasher.update(b"\0");
        hasher.update(self.first_name.as_bytes());
        hasher.update(b"\0");
        hasher.update(self.second_name.as_bytes());
        hasher.update(b"\0");
        hasher.update(&[self.percentage]);
        hasher.finalize().to_hex().to_string()
    }
}

/// Aggregate statistics, always derived from devices and plays.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerStats {
    pub total_plays: u64,
    pub unique_devices: u64,
}

impl LedgerStats {
    pub fn new(total_plays: u64, unique_devices: u64) -> Self {
        Self {
            total_plays,
            unique_devices,
        }
    }
}

/// The single shared document aggregating every device's plays.
///
/// `devices` is an insertion-ordered set: order is preserved so the document
/// round-trips byte for byte, but a device id never appears twice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedLedger {
    #[serde(default)]
    pub devices: Vec<DeviceId>,

    #[serde(default)]
    pub plays: Vec<PlayRecord>,

    #[serde(default)]
    pub stats: LedgerStats,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SharedLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a play with the same fingerprint is already recorded.
    pub fn contains_play(&self, record: &PlayRecord) -> bool {
        let fingerprint = record.fingerprint();
        self.plays.iter().any(|play| play.fingerprint() == fingerprint)
    }

    /// Merge a play into the ledger and recompute stats.
    ///
    /// Returns `false` when the play was already present; the ledger is still
    /// normalized in that case.
    pub fn merge_play(&mut self, record: &PlayRecord) -> bool {
        let appended = if self.contains_play(record) {
            false
        } else {
            self.plays.push(record.clone());
            true
        };
        self.recompute_stats();
        appended
    }

    /// Rebuild `devices` and `stats` from `plays`.
    ///
    /// Existing device order is kept for devices that still have plays; new
    /// devices are appended in order of first appearance.
    pub fn recompute_stats(&mut self) {
        let seen: HashSet<&str> = self.plays.iter().map(|p| p.device_id.as_str()).collect();

        let mut devices: Vec<DeviceId> = Vec::with_capacity(seen.len());
        let mut listed: HashSet<String> = HashSet::with_capacity(seen.len());
        for device in &self.devices {
            if seen.contains(device.as_str()) && listed.insert(device.clone()) {
                devices.push(device.clone());
            }
        }
        for play in &self.plays {
            if listed.insert(play.device_id.clone()) {
                devices.push(play.device_id.clone());
            }
        }

        self.devices = devices;
        self.stats = LedgerStats::new(self.plays.len() as u64, self.devices.len() as u64);
    }

    /// Whether stats and devices agree with plays.
    pub fn is_consistent(&self) -> bool {
        let mut normalized = self.clone();
        normalized.recompute_stats();
        normalized.devices == self.devices && normalized.stats == self.stats
    }
}

/// This device's most-recent-first play log, bounded to [`HISTORY_LIMIT`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocalHistory {
    records: Vec<PlayRecord>,
}

impl LocalHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from records already ordered most-recent-first.
    pub fn from_records(mut records: Vec<PlayRecord>) -> Self {
        records.truncate(HISTORY_LIMIT);
        Self { records }
    }

    pub fn records(&self) -> &[PlayRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn latest(&self) -> Option<&PlayRecord> {
        self.records.first()
    }

    /// Prepend a record, evicting the oldest beyond the limit.
    pub fn push_front(&mut self, record: PlayRecord) {
        self.records.insert(0, record);
        self.records.truncate(HISTORY_LIMIT);
    }

    /// Statistics computed from this device's history alone.
    ///
    /// Always an under-count relative to the shared ledger.
    pub fn local_stats(&self) -> LedgerStats {
        let devices: HashSet<&str> = self.records.iter().map(|r| r.device_id.as_str()).collect();
        LedgerStats::new(self.records.len() as u64, devices.len() as u64)
    }
}

/// ISO-8601 timestamps with exactly three fractional digits and a `Z` suffix.
mod millis_timestamp {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn play(device: &str, minute: u32) -> PlayRecord {
        let at = Utc.with_ymd_and_hms(2024, 2, 14, 12, minute, 0).unwrap();
        PlayRecord::new("Alice", "Bob", 42, device).with_created_at(at)
    }

    #[test]
    fn test_merge_same_device_counts_once() {
        let mut ledger = SharedLedger::new();
        ledger.merge_play(&play("d1", 1));
        ledger.merge_play(&play("d1", 2));

        assert_eq!(ledger.devices, vec!["d1".to_string()]);
        assert_eq!(ledger.stats, LedgerStats::new(2, 1));
    }

    #[test]
    fn test_merge_is_idempotent_per_play() {
        let mut ledger = SharedLedger::new();
        let record = play("d1", 1);

        assert!(ledger.merge_play(&record));
        assert!(!ledger.merge_play(&record));
        assert_eq!(ledger.plays.len(), 1);
        assert_eq!(ledger.stats.total_plays, 1);
    }

    #[test]
    fn test_recompute_repairs_drifted_stats() {
        let mut ledger = SharedLedger {
            devices: vec!["ghost".into(), "d2".into(), "d2".into()],
            plays: vec![play("d1", 1), play("d2", 2)],
            stats: LedgerStats::new(40, 9),
            extra: Map::new(),
        };
        assert!(!ledger.is_consistent());

        ledger.recompute_stats();

        assert_eq!(ledger.devices, vec!["d2".to_string(), "d1".to_string()]);
        assert_eq!(ledger.stats, LedgerStats::new(2, 2));
        assert!(ledger.is_consistent());
    }

    #[test]
    fn test_fingerprint_ignores_display_date() {
        let a = play("d1", 1);
        let mut b = a.clone();
        b.display_date = None;
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_ne!(a.fingerprint(), play("d2", 1).fingerprint());
    }

    #[test]
    fn test_play_record_wire_format() {
        let record = play("d1", 5);
        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["name1"], "Alice");
        assert_eq!(value["name2"], "Bob");
        assert_eq!(value["deviceId"], "d1");
        assert_eq!(value["timestamp"], "2024-02-14T12:05:00.000Z");
        assert_eq!(value["date"], "2/14/2024, 12:05:00 PM");
    }

    #[test]
    fn test_play_record_without_date_stays_without_date() {
        let raw = r#"{"name1":"A","name2":"B","percentage":7,"deviceId":"x","timestamp":"2024-01-01T00:00:00.120Z"}"#;
        let record: PlayRecord = serde_json::from_str(raw).unwrap();
        assert!(record.display_date.is_none());
        assert_eq!(serde_json::to_string(&record).unwrap(), raw);
    }

    #[test]
    fn test_history_push_front_bounds_length() {
        let mut history = LocalHistory::new();
        for minute in 0..12 {
            history.push_front(play("d1", minute));
        }
        assert_eq!(history.len(), HISTORY_LIMIT);
        assert_eq!(history.latest().unwrap().created_at.format("%M").to_string(), "11");
    }

    #[test]
    fn test_local_stats_counts_distinct_devices() {
        let history = LocalHistory::from_records(vec![play("d1", 2), play("d2", 1), play("d1", 0)]);
        assert_eq!(history.local_stats(), LedgerStats::new(3, 2));
    }

    #[test]
    fn test_unknown_fields_survive_a_merge() {
        let raw = r#"{
  "devices": ["d1"],
  "plays": [
    {
      "name1": "A",
      "name2": "B",
      "percentage": 7,
      "deviceId": "d1",
      "timestamp": "2024-01-01T00:00:00.120Z",
      "mood": "sunny"
    }
  ],
  "stats": {"totalPlays": 1, "uniqueDevices": 1},
  "schema": 2
}"#;
        let mut ledger: SharedLedger = serde_json::from_str(raw).unwrap();
        assert_eq!(ledger.extra["schema"], 2);
        assert_eq!(ledger.plays[0].extra["mood"], "sunny");

        assert!(ledger.merge_play(&play("d2", 3)));
        let value = serde_json::to_value(&ledger).unwrap();
        assert_eq!(value["schema"], 2);
        assert_eq!(value["plays"][0]["mood"], "sunny");
        assert!(value["plays"][1].get("mood").is_none());
        assert_eq!(value["stats"]["totalPlays"], 2);
    }
}
