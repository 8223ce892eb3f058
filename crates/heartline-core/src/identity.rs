//! Device identity provider.

use std::sync::Arc;

use log::{debug, warn};
use uuid::Uuid;

use crate::storage::{KeyValueStore, Namespace};
use crate::types::DeviceId;

/// Storage key holding the installation identifier.
pub const DEVICE_ID_KEY: &str = "device_id";

/// Produces a stable per-installation identifier.
///
/// The identity is advisory, not a credential: if it cannot be read back a new
/// one is generated, and the last write wins.
pub struct DeviceIdentityProvider {
    store: Arc<dyn KeyValueStore>,
}

impl DeviceIdentityProvider {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Return the persisted identity, creating and persisting one on first use.
    pub fn get_or_create(&self) -> DeviceId {
        match self.store.get(DEVICE_ID_KEY, Namespace::Private) {
            Ok(Some(id)) if !id.trim().is_empty() => return id.trim().to_string(),
            Ok(_) => {}
            Err(err) => warn!("Could not read device identity, generating a new one: {}", err),
        }

        let id = Uuid::new_v4().to_string();
        if let Err(err) = self.store.set(DEVICE_ID_KEY, &id, Namespace::Private) {
            warn!("Could not persist device identity {}: {}", id, err);
        } else {
            debug!("Created device identity {}", id);
        }
        id
    }
}
