//! In-memory versioned document store.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::error::{HeartlineError, Result};
use crate::remote::traits::{DocumentStore, StoredDocument, VersionToken};

#[derive(Default)]
struct MemoryState {
    documents: HashMap<String, StoredDocument>,
    revision: u64,
    offline: bool,
    fetches: usize,
    puts: usize,
    messages: Vec<String>,
}

/// Process-local document store with switchable reachability.
///
/// Several clients sharing one instance (through `Arc`) behave like
/// independent devices racing on the same remote document.
#[derive(Default)]
pub struct MemoryDocumentStore {
    state: Mutex<MemoryState>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_state(&self) -> Result<MutexGuard<'_, MemoryState>> {
        self.state
            .lock()
            .map_err(|_| HeartlineError::Storage("Document store poisoned".to_string()))
    }

    /// Make every subsequent call fail with `Unreachable`.
    pub fn set_offline(&self, offline: bool) {
        if let Ok(mut state) = self.lock_state() {
            state.offline = offline;
        }
    }

    /// Number of fetch calls received, including failed ones.
    pub fn fetch_count(&self) -> usize {
        self.lock_state().map(|s| s.fetches).unwrap_or(0)
    }

    /// Number of put calls received, including failed ones.
    pub fn put_count(&self) -> usize {
        self.lock_state().map(|s| s.puts).unwrap_or(0)
    }

    /// Messages of successful writes, oldest first.
    pub fn messages(&self) -> Vec<String> {
        self.lock_state()
            .map(|s| s.messages.clone())
            .unwrap_or_default()
    }
}

impl DocumentStore for MemoryDocumentStore {
    fn fetch(&self, key: &str) -> Result<Option<StoredDocument>> {
        let mut state = self.lock_state()?;
        state.fetches += 1;
        if state.offline {
            return Err(HeartlineError::Unreachable("memory store offline".to_string()));
        }
        Ok(state.documents.get(key).cloned())
    }

    fn put(
        &self,
        key: &str,
        bytes: &[u8],
        expected: Option<&VersionToken>,
        message: &str,
    ) -> Result<VersionToken> {
        let mut state = self.lock_state()?;
        state.puts += 1;
        if state.offline {
            return Err(HeartlineError::Unreachable("memory store offline".to_string()));
        }

        let current = state.documents.get(key).map(|doc| &doc.version);
        match (current, expected) {
            (None, None) => {}
            (Some(current), Some(expected)) if current == expected => {}
            (Some(current), _) => {
                return Err(HeartlineError::Conflict(format!(
                    "{} is at version {}",
                    key, current
                )))
            }
            (None, Some(_)) => {
                return Err(HeartlineError::Conflict(format!("{} no longer exists", key)))
            }
        }

        state.revision += 1;
        let version = VersionToken::derive(state.revision, bytes);
        state.documents.insert(
            key.to_string(),
            StoredDocument {
                bytes: bytes.to_vec(),
                version: version.clone(),
            },
        );
        state.messages.push(message.to_string());
        Ok(version)
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_then_update_with_token() {
        let store = MemoryDocumentStore::new();
        let v1 = store.put("doc", b"one", None, "create").unwrap();
        let v2 = store.put("doc", b"two", Some(&v1), "update").unwrap();

        assert_ne!(v1, v2);
        let doc = store.fetch("doc").unwrap().unwrap();
        assert_eq!(doc.bytes, b"two");
        assert_eq!(doc.version, v2);
        assert_eq!(store.messages(), vec!["create", "update"]);
    }

    #[test]
    fn test_stale_token_conflicts() {
        let store = MemoryDocumentStore::new();
        let v1 = store.put("doc", b"one", None, "create").unwrap();
        store.put("doc", b"two", Some(&v1), "update").unwrap();

        let err = store.put("doc", b"three", Some(&v1), "late").unwrap_err();
        assert!(err.is_retryable());
    }

    #[test]
    fn test_create_over_existing_conflicts() {
        let store = MemoryDocumentStore::new();
        store.put("doc", b"one", None, "create").unwrap();
        let err = store.put("doc", b"two", None, "create again").unwrap_err();
        assert!(matches!(err, HeartlineError::Conflict(_)));
    }

    #[test]
    fn test_offline_counts_calls() {
        let store = MemoryDocumentStore::new();
        store.set_offline(true);
        assert!(matches!(store.fetch("doc"), Err(HeartlineError::Unreachable(_))));
        assert_eq!(store.fetch_count(), 1);
        assert_eq!(store.put_count(), 0);
    }
}
