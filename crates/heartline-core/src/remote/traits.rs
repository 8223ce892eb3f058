//! Versioned document store trait.
//!
//! The shared ledger lives in a single document behind optimistic
//! concurrency: every read returns an opaque [`VersionToken`] and every write
//! must present the token it read. Any backend with a compare-and-set
//! primitive fits (object storage ETags, a row version column, a Git blob SHA).

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Opaque version of a stored document. Changes on every successful write.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionToken(String);

impl VersionToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Derive a token from a write counter and the written bytes.
    ///
    /// Including the counter guarantees a new token even when identical
    /// content is written twice.
    pub fn derive(revision: u64, bytes: &[u8]) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&revision.to_le_bytes());
        hasher.update(bytes);
        let hex = hasher.finalize().to_hex();
        Self(hex[..40].to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VersionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Raw document bytes together with the version they were read at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredDocument {
    pub bytes: Vec<u8>,
    pub version: VersionToken,
}

/// Versioned key-value store holding shared documents.
///
/// Error contract:
/// - `HeartlineError::Unreachable` for network, timeout, or service failures
/// - `HeartlineError::Conflict` when `put` is given a token that no longer
///   matches (or `None` for a document that already exists)
pub trait DocumentStore: Send + Sync {
    /// Fetch a document.
    ///
    /// Returns `Ok(None)` if the document has never been created.
    fn fetch(&self, key: &str) -> Result<Option<StoredDocument>>;

    /// Write a document if its current version matches `expected`.
    ///
    /// `expected == None` means create-if-absent. `message` describes the
    /// change for backends that keep a history.
    ///
    /// # Returns
    ///
    /// Returns the new version token.
    fn put(
        &self,
        key: &str,
        bytes: &[u8],
        expected: Option<&VersionToken>,
        message: &str,
    ) -> Result<VersionToken>;

    /// Short backend name for diagnostics.
    fn describe(&self) -> String;
}

impl<T: DocumentStore + ?Sized> DocumentStore for Arc<T> {
    fn fetch(&self, key: &str) -> Result<Option<StoredDocument>> {
        (**self).fetch(key)
    }

    fn put(
        &self,
        key: &str,
        bytes: &[u8],
        expected: Option<&VersionToken>,
        message: &str,
    ) -> Result<VersionToken> {
        (**self).put(key, bytes, expected, message)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// A store that is never reachable.
///
/// Used when no remote backend is configured, so every submission takes the
/// local-only path.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineStore;

impl DocumentStore for OfflineStore {
    fn fetch(&self, _key: &str) -> Result<Option<StoredDocument>> {
        Err(crate::HeartlineError::Unreachable(
            "No remote backend configured".to_string(),
        ))
    }

    fn put(
        &self,
        _key: &str,
        _bytes: &[u8],
        _expected: Option<&VersionToken>,
        _message: &str,
    ) -> Result<VersionToken> {
        Err(crate::HeartlineError::Unreachable(
            "No remote backend configured".to_string(),
        ))
    }

    fn describe(&self) -> String {
        "offline".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_tokens_differ_per_revision() {
        let a = VersionToken::derive(1, b"{}");
        let b = VersionToken::derive(2, b"{}");
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 40);
        assert_eq!(a, VersionToken::derive(1, b"{}"));
    }

    #[test]
    fn test_offline_store_is_unreachable() {
        let store = OfflineStore;
        assert!(matches!(
            store.fetch("plays.json"),
            Err(crate::HeartlineError::Unreachable(_))
        ));
        assert!(matches!(
            store.put("plays.json", b"{}", None, "msg"),
            Err(crate::HeartlineError::Unreachable(_))
        ));
    }
}
