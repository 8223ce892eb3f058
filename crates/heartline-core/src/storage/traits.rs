//! Key-value store trait for device-local persistence.
//!
//! Heartline persists two small values per device (the device identity and the
//! play history) and, for the mock shared backend, the shared document itself.
//! All of them go through [`KeyValueStore`], so a backend only needs string
//! get/set/delete/list keyed by name.

use std::fs::File;
use std::sync::Arc;

use fs2::FileExt;

use crate::error::Result;

/// Selects which namespace a key lives in.
///
/// `Private` values belong to this installation. `Shared` values model data
/// visible to every client of the same store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Namespace {
    Private,
    Shared,
}

impl Namespace {
    pub fn from_shared_flag(shared: bool) -> Self {
        if shared {
            Namespace::Shared
        } else {
            Namespace::Private
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Namespace::Private => "private",
            Namespace::Shared => "shared",
        }
    }
}

/// Exclusive hold on one key, released on drop.
///
/// Backends whose values are visible to other processes hand out a guard
/// backed by an OS file lock; purely in-process backends return a no-op guard.
#[derive(Debug, Default)]
pub struct KeyLock {
    file: Option<File>,
}

impl KeyLock {
    /// A guard that excludes nobody.
    pub fn noop() -> Self {
        Self::default()
    }

    /// Block until `file` is exclusively locked.
    pub fn exclusive(file: File) -> std::io::Result<Self> {
        file.lock_exclusive()?;
        Ok(Self { file: Some(file) })
    }

    pub fn is_held(&self) -> bool {
        self.file.is_some()
    }
}

impl Drop for KeyLock {
    fn drop(&mut self) {
        if let Some(file) = &self.file {
            let _ = FileExt::unlock(file);
        }
    }
}

/// Generic string key-value interface.
///
/// Implementations must ensure:
/// - `set` replaces the whole value atomically
/// - namespaces never alias each other
/// - `list` returns keys in ascending order
pub trait KeyValueStore: Send + Sync {
    /// Read a value.
    ///
    /// Returns `Ok(None)` when the key is absent.
    fn get(&self, key: &str, namespace: Namespace) -> Result<Option<String>>;

    /// Write a value, replacing any previous one.
    fn set(&self, key: &str, value: &str, namespace: Namespace) -> Result<()>;

    /// Delete a value.
    ///
    /// Returns `true` if a value was removed.
    fn delete(&self, key: &str, namespace: Namespace) -> Result<bool>;

    /// List keys starting with `prefix`.
    fn list(&self, prefix: &str, namespace: Namespace) -> Result<Vec<String>>;

    /// Take an exclusive lock on `key` for a read-compare-write section.
    ///
    /// The lock must exclude every other holder of the same key, including
    /// other processes sharing the backing storage.
    fn lock(&self, _key: &str, _namespace: Namespace) -> Result<KeyLock> {
        Ok(KeyLock::noop())
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    fn get(&self, key: &str, namespace: Namespace) -> Result<Option<String>> {
        (**self).get(key, namespace)
    }

    fn set(&self, key: &str, value: &str, namespace: Namespace) -> Result<()> {
        (**self).set(key, value, namespace)
    }

    fn delete(&self, key: &str, namespace: Namespace) -> Result<bool> {
        (**self).delete(key, namespace)
    }

    fn list(&self, prefix: &str, namespace: Namespace) -> Result<Vec<String>> {
        (**self).list(prefix, namespace)
    }

    fn lock(&self, key: &str, namespace: Namespace) -> Result<KeyLock> {
        (**self).lock(key, namespace)
    }
}
