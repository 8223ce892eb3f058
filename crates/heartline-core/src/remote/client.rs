//! Remote ledger client.
//!
//! Encodes the [`SharedLedger`] as UTF-8 JSON and moves it through a
//! [`DocumentStore`] under one well-known key.

use std::sync::Arc;

use log::{debug, warn};

use crate::error::Result;
use crate::remote::traits::{DocumentStore, VersionToken};
use crate::types::{PlayRecord, SharedLedger};

/// Key of the shared document.
pub const DEFAULT_DOCUMENT_KEY: &str = "plays.json";

/// A ledger together with the version it was read at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionedLedger {
    pub ledger: SharedLedger,
    pub version: VersionToken,
}

pub struct RemoteLedgerClient {
    store: Arc<dyn DocumentStore>,
    key: String,
}

impl RemoteLedgerClient {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self::with_key(store, DEFAULT_DOCUMENT_KEY)
    }

    pub fn with_key(store: Arc<dyn DocumentStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn describe(&self) -> String {
        format!("{} ({})", self.store.describe(), self.key)
    }

    /// Fetch the shared ledger.
    ///
    /// Returns `Ok(None)` if the document has never been created. A document
    /// that exists but cannot be parsed is returned as an empty ledger with its
    /// version, so the next write replaces it.
    ///
    /// # Errors
    ///
    /// Returns `HeartlineError::Unreachable` on transport failures.
    pub fn fetch_ledger(&self) -> Result<Option<VersionedLedger>> {
        let Some(document) = self.store.fetch(&self.key)? else {
            debug!("Shared ledger {} not created yet", self.key);
            return Ok(None);
        };

        let ledger = if document.bytes.iter().all(u8::is_ascii_whitespace) {
            SharedLedger::new()
        } else {
            decode_ledger(&document.bytes).unwrap_or_else(|err| {
                warn!(
                    "Shared ledger {} at {} is unreadable, starting empty: {}",
                    self.key, document.version, err
                );
                SharedLedger::new()
            })
        };

        Ok(Some(VersionedLedger {
            ledger,
            version: document.version,
        }))
    }

    /// Write the shared ledger if it is still at `expected`.
    ///
    /// `expected == None` creates the document.
    ///
    /// # Errors
    ///
    /// Returns `HeartlineError::Conflict` when another writer got there first,
    /// `HeartlineError::Unreachable` on transport failures.
    pub fn write_ledger(
        &self,
        ledger: &SharedLedger,
        expected: Option<&VersionToken>,
        message: &str,
    ) -> Result<VersionToken> {
        let bytes = encode_ledger(ledger)?;
        let version = self.store.put(&self.key, &bytes, expected, message)?;
        debug!("Wrote shared ledger {} at {}", self.key, version);
        Ok(version)
    }
}

/// Serialize a ledger with two-space indentation.
pub fn encode_ledger(ledger: &SharedLedger) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(ledger)?)
}

pub fn decode_ledger(bytes: &[u8]) -> Result<SharedLedger> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Change description attached to a write that adds `record`.
pub fn play_message(record: &PlayRecord) -> String {
    format!(
        "New play: {} \u{2764}\u{fe0f} {} = {}%",
        record.first_name, record.second_name, record.percentage
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::MemoryDocumentStore;
    use crate::HeartlineError;

    fn sample_ledger() -> SharedLedger {
        let mut ledger = SharedLedger::new();
        ledger.merge_play(&PlayRecord::new("Alice", "Bob", 77, "d1"));
        ledger.merge_play(&PlayRecord::new("Carol", "Dan", 12, "d2"));
        ledger
    }

    #[test]
    fn test_write_then_fetch_round_trip() {
        let store = Arc::new(MemoryDocumentStore::new());
        let client = RemoteLedgerClient::new(store);
        let ledger = sample_ledger();

        let created = client.write_ledger(&SharedLedger::new(), None, "init").unwrap();
        let written = client.write_ledger(&ledger, Some(&created), "plays").unwrap();
        let fetched = client.fetch_ledger().unwrap().unwrap();

        assert_eq!(fetched.ledger, ledger);
        assert_eq!(fetched.version, written);
        assert_ne!(fetched.version, created);
    }

    #[test]
    fn test_encoding_is_byte_stable() {
        let bytes = encode_ledger(&sample_ledger()).unwrap();
        let again = encode_ledger(&decode_ledger(&bytes).unwrap()).unwrap();
        assert_eq!(bytes, again);
    }

    #[test]
    fn test_fetch_missing_is_none() {
        let client = RemoteLedgerClient::new(Arc::new(MemoryDocumentStore::new()));
        assert!(client.fetch_ledger().unwrap().is_none());
    }

    #[test]
    fn test_unparseable_document_reads_as_empty_with_version() {
        let store = Arc::new(MemoryDocumentStore::new());
        let version = store.put(DEFAULT_DOCUMENT_KEY, b"<html>", None, "junk").unwrap();
        let client = RemoteLedgerClient::new(store);

        let fetched = client.fetch_ledger().unwrap().unwrap();
        assert_eq!(fetched.ledger, SharedLedger::new());
        assert_eq!(fetched.version, version);
    }

    #[test]
    fn test_stale_write_is_conflict() {
        let store = Arc::new(MemoryDocumentStore::new());
        let client = RemoteLedgerClient::new(store);
        let v1 = client.write_ledger(&SharedLedger::new(), None, "init").unwrap();
        client.write_ledger(&sample_ledger(), Some(&v1), "a").unwrap();

        let err = client
            .write_ledger(&sample_ledger(), Some(&v1), "b")
            .unwrap_err();
        assert!(matches!(err, HeartlineError::Conflict(_)));
    }

    #[test]
    fn test_play_message() {
        let record = PlayRecord::new("Alice", "Bob", 88, "d1");
        assert_eq!(play_message(&record), "New play: Alice \u{2764}\u{fe0f} Bob = 88%");
    }
}
