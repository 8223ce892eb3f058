//! Local history cache.
//!
//! A bounded, most-recent-first log of this device's plays. It is a cache,
//! not a store of record: unreadable data is dropped and replaced.

use std::sync::Arc;

use log::warn;

use crate::storage::{KeyValueStore, Namespace};
use crate::types::{LocalHistory, PlayRecord};

/// Storage key holding the serialized history.
pub const HISTORY_KEY: &str = "game_history";

pub struct LocalHistoryCache {
    store: Arc<dyn KeyValueStore>,
}

impl LocalHistoryCache {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Load the persisted history.
    ///
    /// Missing, unreadable, or unparseable data yields an empty history.
    pub fn load(&self) -> LocalHistory {
        let raw = match self.store.get(HISTORY_KEY, Namespace::Private) {
            Ok(Some(raw)) => raw,
            Ok(None) => return LocalHistory::new(),
            Err(err) => {
                warn!("Could not read local history: {}", err);
                return LocalHistory::new();
            }
        };

        match serde_json::from_str::<Vec<PlayRecord>>(&raw) {
            Ok(records) => LocalHistory::from_records(records),
            Err(err) => {
                warn!("Discarding unparseable local history: {}", err);
                LocalHistory::new()
            }
        }
    }

    /// Prepend `record`, truncate, and persist.
    ///
    /// Returns the updated history even when persisting fails.
    pub fn append(&self, record: &PlayRecord) -> LocalHistory {
        let mut history = self.load();
        history.push_front(record.clone());

        match serde_json::to_string(&history) {
            Ok(encoded) => {
                if let Err(err) = self.store.set(HISTORY_KEY, &encoded, Namespace::Private) {
                    warn!("Could not persist local history: {}", err);
                }
            }
            Err(err) => warn!("Could not encode local history: {}", err),
        }

        history
    }
}
