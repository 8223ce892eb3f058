//! Directory-backed key-value store.
//!
//! Each namespace is a subdirectory of the root and each key is one file:
//!
//! ```text
//! <root>/private/device_id
//! <root>/private/game_history
//! <root>/shared/plays.json
//! ```
//!
//! Writes go through [`crate::fs::write_atomic`], so a crash mid-write leaves
//! the previous value in place. [`KeyValueStore::lock`] takes an OS lock on a
//! hidden `.<key>.lock` sibling, which excludes other processes sharing the
//! directory as well as other handles in this one.

use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{HeartlineError, Result};
use crate::fs::write_atomic;
use crate::storage::traits::{KeyLock, KeyValueStore, Namespace};

pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    const MAX_KEY_BYTES: usize = 128;

    /// Open a store rooted at `root`, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| {
            HeartlineError::Storage(format!(
                "Failed to create data directory {}: {}",
                root.display(),
                e
            ))
        })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn validate_key(key: &str) -> Result<()> {
        if key.is_empty() {
            return Err(HeartlineError::InvalidInput("Empty key".to_string()));
        }
        if key.len() > Self::MAX_KEY_BYTES {
            return Err(HeartlineError::InvalidInput(format!(
                "Key too long (max {} bytes)",
                Self::MAX_KEY_BYTES
            )));
        }
        if key.starts_with('.')
            || !key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
        {
            return Err(HeartlineError::InvalidInput(format!(
                "Key contains invalid characters: {}",
                key
            )));
        }
        Ok(())
    }

    fn namespace_dir(&self, namespace: Namespace) -> PathBuf {
        self.root.join(namespace.as_str())
    }

    fn key_path(&self, key: &str, namespace: Namespace) -> Result<PathBuf> {
        Self::validate_key(key)?;
        Ok(self.namespace_dir(namespace).join(key))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str, namespace: Namespace) -> Result<Option<String>> {
        let path = self.key_path(key, namespace)?;
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(HeartlineError::Storage(format!(
                "Failed to read {}: {}",
                path.display(),
                err
            ))),
        }
    }

    fn set(&self, key: &str, value: &str, namespace: Namespace) -> Result<()> {
        let path = self.key_path(key, namespace)?;
        fs::create_dir_all(self.namespace_dir(namespace))?;
        write_atomic(&path, value.as_bytes()).map_err(|e| {
            HeartlineError::Storage(format!("Failed to write {}: {}", path.display(), e))
        })
    }

    fn delete(&self, key: &str, namespace: Namespace) -> Result<bool> {
        let path = self.key_path(key, namespace)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    fn list(&self, prefix: &str, namespace: Namespace) -> Result<Vec<String>> {
        let dir = self.namespace_dir(namespace);
        let read_dir = match fs::read_dir(&dir) {
            Ok(read_dir) => read_dir,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        let mut keys = Vec::new();
        for entry in read_dir {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            if name.starts_with('.') || !name.starts_with(prefix) {
                continue;
            }
            keys.push(name);
        }
        keys.sort();
        Ok(keys)
    }

    fn lock(&self, key: &str, namespace: Namespace) -> Result<KeyLock> {
        Self::validate_key(key)?;
        let dir = self.namespace_dir(namespace);
        fs::create_dir_all(&dir)?;
        let lock_path = dir.join(format!(".{}.lock", key));
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|e| {
                HeartlineError::Storage(format!("Failed to open {}: {}", lock_path.display(), e))
            })?;
        KeyLock::exclusive(file).map_err(|e| {
            HeartlineError::Storage(format!("Failed to lock {}: {}", lock_path.display(), e))
        })
    }
}
