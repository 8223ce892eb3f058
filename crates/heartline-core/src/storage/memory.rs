//! In-memory key-value store.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use crate::error::{HeartlineError, Result};
use crate::storage::traits::{KeyValueStore, Namespace};

type Entries = BTreeMap<(Namespace, String), String>;

/// Process-local store, used in tests and as a throwaway backend.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<Entries>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_entries(&self) -> Result<MutexGuard<'_, Entries>> {
        self.entries
            .lock()
            .map_err(|_| HeartlineError::Storage("Memory store poisoned".to_string()))
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str, namespace: Namespace) -> Result<Option<String>> {
        let entries = self.lock_entries()?;
        Ok(entries.get(&(namespace, key.to_string())).cloned())
    }

    fn set(&self, key: &str, value: &str, namespace: Namespace) -> Result<()> {
        let mut entries = self.lock_entries()?;
        entries.insert((namespace, key.to_string()), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str, namespace: Namespace) -> Result<bool> {
        let mut entries = self.lock_entries()?;
        Ok(entries.remove(&(namespace, key.to_string())).is_some())
    }

    fn list(&self, prefix: &str, namespace: Namespace) -> Result<Vec<String>> {
        let entries = self.lock_entries()?;
        Ok(entries
            .keys()
            .filter(|(ns, key)| *ns == namespace && key.starts_with(prefix))
            .map(|(_, key)| key.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_delete() {
        let store = MemoryStore::new();
        store.set("device_id", "abc", Namespace::Private).unwrap();

        assert_eq!(
            store.get("device_id", Namespace::Private).unwrap(),
            Some("abc".to_string())
        );
        assert!(store.delete("device_id", Namespace::Private).unwrap());
        assert!(!store.delete("device_id", Namespace::Private).unwrap());
        assert_eq!(store.get("device_id", Namespace::Private).unwrap(), None);
    }

    #[test]
    fn test_namespaces_are_separate() {
        let store = MemoryStore::new();
        store.set("plays.json", "private", Namespace::Private).unwrap();
        store.set("plays.json", "shared", Namespace::Shared).unwrap();

        assert_eq!(
            store.get("plays.json", Namespace::Shared).unwrap().as_deref(),
            Some("shared")
        );
        assert_eq!(
            store.get("plays.json", Namespace::Private).unwrap().as_deref(),
            Some("private")
        );
    }

    #[test]
    fn test_list_filters_prefix_in_order() {
        let store = MemoryStore::new();
        store.set("game_b", "1", Namespace::Private).unwrap();
        store.set("game_a", "1", Namespace::Private).unwrap();
        store.set("other", "1", Namespace::Private).unwrap();
        store.set("game_c", "1", Namespace::Shared).unwrap();

        let keys = store.list("game_", Namespace::Private).unwrap();
        assert_eq!(keys, vec!["game_a".to_string(), "game_b".to_string()]);
    }
}
