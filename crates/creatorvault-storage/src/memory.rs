// SPDX-FileCopyrightText: 2026 CreatorVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory implementations of the storage traits.
//!
//! Used by tests and by hosts that keep state elsewhere. A single mutex
//! guards each map, so multi-key operations are atomic.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use creatorvault_core::{BulkDataStore, Category, HealthStatus, KeyValueStore, VaultError};
use serde_json::Value;

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, VaultError> {
    mutex
        .lock()
        .map_err(|_| VaultError::Internal("in-memory store mutex poisoned".to_string()))
}

/// Key-value medium held in a `BTreeMap`.
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every entry, for byte-level comparisons in tests.
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, VaultError> {
        Ok(lock(&self.entries)?.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), VaultError> {
        lock(&self.entries)?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), VaultError> {
        lock(&self.entries)?.remove(key);
        Ok(())
    }

    async fn clear(&self) -> Result<(), VaultError> {
        lock(&self.entries)?.clear();
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>, VaultError> {
        Ok(lock(&self.entries)?.keys().cloned().collect())
    }

    async fn set_many(&self, entries: &[(String, String)]) -> Result<(), VaultError> {
        let mut map = lock(&self.entries)?;
        for (key, value) in entries {
            map.insert(key.clone(), value.clone());
        }
        Ok(())
    }

    async fn remove_many(&self, keys: &[String]) -> Result<(), VaultError> {
        let mut map = lock(&self.entries)?;
        for key in keys {
            map.remove(key);
        }
        Ok(())
    }
}

/// Bulk-data store held in a `HashMap`, with optional injected write failures.
#[derive(Debug, Default)]
pub struct MemoryBulkStore {
    records: Mutex<HashMap<Category, Vec<Value>>>,
    failing: Mutex<HashSet<Category>>,
}

impl MemoryBulkStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `replace_all` on `category` fail without writing.
    pub fn fail_writes_for(&self, category: Category) {
        if let Ok(mut failing) = self.failing.lock() {
            failing.insert(category);
        }
    }

    /// Copy of every category's records.
    pub fn snapshot(&self) -> HashMap<Category, Vec<Value>> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl BulkDataStore for MemoryBulkStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn get_all(&self, category: Category) -> Result<Vec<Value>, VaultError> {
        Ok(lock(&self.records)?
            .get(&category)
            .cloned()
            .unwrap_or_default())
    }

    async fn replace_all(&self, category: Category, records: Vec<Value>) -> Result<(), VaultError> {
        if lock(&self.failing)?.contains(&category) {
            return Err(VaultError::storage(format!(
                "injected write failure for category `{category}`"
            )));
        }
        let mut map = lock(&self.records)?;
        if records.is_empty() {
            map.remove(&category);
        } else {
            map.insert(category, records);
        }
        Ok(())
    }

    async fn health_check(&self) -> Result<HealthStatus, VaultError> {
        Ok(HealthStatus::Healthy)
    }
}
