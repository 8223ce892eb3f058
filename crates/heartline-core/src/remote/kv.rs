//! Document store layered over a [`KeyValueStore`]'s shared namespace.
//!
//! This is the pluggable backend: any key-value store can host the shared
//! ledger without a network. Each document is kept in an envelope carrying
//! its revision and version token next to the base64 content.
//!
//! `put` holds the store's key lock across read, compare and write, so two
//! writers holding the same stale token cannot both succeed, even from
//! separate processes sharing one [`crate::storage::FileStore`] directory.

use std::sync::{Arc, Mutex};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::{HeartlineError, Result};
use crate::remote::traits::{DocumentStore, StoredDocument, VersionToken};
use crate::storage::{KeyValueStore, Namespace};

#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    revision: u64,
    version: VersionToken,
    message: String,
    content: String,
}

/// Current state of a key as seen by this store.
struct Current {
    revision: u64,
    document: StoredDocument,
}

pub struct KvDocumentStore {
    store: Arc<dyn KeyValueStore>,
    // Serializes compare-and-set within this process.
    write_lock: Mutex<()>,
}

impl KvDocumentStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    fn read_current(&self, key: &str) -> Result<Option<Current>> {
        let raw = match self.store.get(key, Namespace::Shared) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Ok(None),
            Err(err) => return Err(HeartlineError::Unreachable(err.to_string())),
        };

        match serde_json::from_str::<Envelope>(&raw) {
            Ok(envelope) => {
                let bytes = STANDARD.decode(envelope.content.as_bytes()).unwrap_or_else(|e| {
                    warn!("Shared document {} has undecodable content: {}", key, e);
                    Vec::new()
                });
                Ok(Some(Current {
                    revision: envelope.revision,
                    document: StoredDocument {
                        bytes,
                        version: envelope.version,
                    },
                }))
            }
            Err(err) => {
                // Corrupt envelope: expose it with a token derived from the raw
                // value so a writer holding that token can replace it.
                warn!("Shared document {} has a corrupt envelope: {}", key, err);
                Ok(Some(Current {
                    revision: 0,
                    document: StoredDocument {
                        bytes: Vec::new(),
                        version: VersionToken::derive(0, raw.as_bytes()),
                    },
                }))
            }
        }
    }
}

impl DocumentStore for KvDocumentStore {
    fn fetch(&self, key: &str) -> Result<Option<StoredDocument>> {
        Ok(self.read_current(key)?.map(|current| current.document))
    }

    fn put(
        &self,
        key: &str,
        bytes: &[u8],
        expected: Option<&VersionToken>,
        message: &str,
    ) -> Result<VersionToken> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| HeartlineError::Storage("Document write lock poisoned".to_string()))?;
        let _key_lock = self
            .store
            .lock(key, Namespace::Shared)
            .map_err(|e| HeartlineError::Unreachable(e.to_string()))?;

        let current = self.read_current(key)?;
        let revision = match (&current, expected) {
            (None, None) => 1,
            (Some(current), Some(expected)) if &current.document.version == expected => {
                current.revision + 1
            }
            (Some(current), _) => {
                return Err(HeartlineError::Conflict(format!(
                    "{} is at version {}",
                    key, current.document.version
                )))
            }
            (None, Some(_)) => {
                return Err(HeartlineError::Conflict(format!("{} no longer exists", key)))
            }
        };

        let version = VersionToken::derive(revision, bytes);
        let envelope = Envelope {
            revision,
            version: version.clone(),
            message: message.to_string(),
            content: STANDARD.encode(bytes),
        };
        let encoded = serde_json::to_string_pretty(&envelope)?;
        self.store
            .set(key, &encoded, Namespace::Shared)
            .map_err(|e| HeartlineError::Unreachable(e.to_string()))?;
        Ok(version)
    }

    fn describe(&self) -> String {
        "local".to_string()
    }
}
