// SPDX-FileCopyrightText: 2026 CreatorVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Encrypt-on-write, decrypt-on-read wrapper over the key-value medium.

use std::sync::Arc;

use creatorvault_core::{KeyValueStore, VaultError};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::crypto;
use crate::kdf::VaultKey;
use crate::vault::is_reserved_key;

/// Persists whole JSON values as encrypted blobs, one per key.
///
/// Every write replaces the previous value. Values without the blob prefix
/// are never interpreted and load as `None`.
#[derive(Clone)]
pub struct EncryptedStateStore {
    kv: Arc<dyn KeyValueStore>,
}

impl EncryptedStateStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Encrypt `value` under `vault_key` and store it under `key`.
    pub async fn save<T>(&self, key: &str, value: &T, vault_key: &VaultKey) -> Result<(), VaultError>
    where
        T: Serialize + ?Sized,
    {
        if is_reserved_key(key) {
            return Err(VaultError::Internal(format!(
                "`{key}` is reserved for vault lock parameters"
            )));
        }
        let blob = crypto::encrypt_json(value, vault_key)?;
        self.kv.set(key, &blob).await?;
        debug!(key, "state saved");
        Ok(())
    }

    /// Load and decrypt the value under `key`.
    ///
    /// Returns `None` when the key is absent or holds unprefixed legacy data.
    /// A blob that fails authentication is an error, never a silent `None`.
    pub async fn load<T>(&self, key: &str, vault_key: &VaultKey) -> Result<Option<T>, VaultError>
    where
        T: DeserializeOwned,
    {
        let Some(raw) = self.kv.get(key).await? else {
            return Ok(None);
        };
        if !crypto::is_encrypted(&raw) {
            warn!(key, "ignoring unencrypted legacy value");
            return Ok(None);
        }
        let value = crypto::decrypt_json(&raw, vault_key)?;
        debug!(key, "state loaded");
        Ok(Some(value))
    }

    /// Like [`load`](Self::load), falling back to `T::default()`.
    pub async fn load_or_default<T>(&self, key: &str, vault_key: &VaultKey) -> Result<T, VaultError>
    where
        T: DeserializeOwned + Default,
    {
        Ok(self.load(key, vault_key).await?.unwrap_or_default())
    }

    pub async fn remove(&self, key: &str) -> Result<(), VaultError> {
        if is_reserved_key(key) {
            return Err(VaultError::Internal(format!(
                "`{key}` is reserved for vault lock parameters"
            )));
        }
        self.kv.remove(key).await
    }
}
