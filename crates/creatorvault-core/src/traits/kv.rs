// SPDX-FileCopyrightText: 2026 CreatorVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! String-keyed, string-valued persistent medium.

use async_trait::async_trait;

use crate::error::VaultError;

/// A simple persistent key-value medium.
///
/// Values are opaque strings. The vault stores its lock parameters here and
/// the encrypted state store writes one blob per key.
#[async_trait]
pub trait KeyValueStore: Send + Sync + 'static {
    /// Read the value stored under `key`.
    async fn get(&self, key: &str) -> Result<Option<String>, VaultError>;

    /// Write `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<(), VaultError>;

    /// Remove `key`. Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<(), VaultError>;

    /// Remove every key.
    async fn clear(&self) -> Result<(), VaultError>;

    /// List all keys, sorted.
    async fn keys(&self) -> Result<Vec<String>, VaultError>;

    /// Write all entries in one atomic step: either every entry lands or none do.
    async fn set_many(&self, entries: &[(String, String)]) -> Result<(), VaultError>;

    /// Remove all listed keys in one atomic step.
    async fn remove_many(&self, keys: &[String]) -> Result<(), VaultError>;
}
