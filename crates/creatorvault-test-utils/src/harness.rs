// SPDX-FileCopyrightText: 2026 CreatorVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end vault flows.

use std::collections::BTreeMap;
use std::num::NonZeroU32;
use std::sync::Arc;

use creatorvault_config::model::{CreatorVaultConfig, StorageConfig};
use creatorvault_core::{BulkDataStore, Category, KeyValueStore, VaultError};
use creatorvault_storage::{Database, MemoryBulkStore, MemoryKeyValueStore};
use creatorvault_vault::{BackupExchange, EncryptedStateStore, Kdf, VaultKey, VaultManager};
use secrecy::SecretString;
use serde_json::Value;
use tracing::debug;

/// PBKDF2 rounds used by harness vaults. Low enough to keep tests fast.
pub const TEST_KDF_ITERATIONS: u32 = 1_000;

/// Wrap a literal as a [`SecretString`].
pub fn secret(s: &str) -> SecretString {
    SecretString::from(s.to_string())
}

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    in_memory: bool,
    iterations: u32,
    password: Option<String>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            in_memory: false,
            iterations: TEST_KDF_ITERATIONS,
            password: None,
        }
    }

    /// Use the in-memory stores instead of a temp SQLite database.
    pub fn with_memory_storage(mut self) -> Self {
        self.in_memory = true;
        self
    }

    /// Override the key derivation work factor.
    pub fn with_kdf_iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }

    /// Set up a vault with `password` during build and keep the session key.
    pub fn with_vault(mut self, password: &str) -> Self {
        self.password = Some(password.to_string());
        self
    }

    /// Build the test harness, creating all required subsystems.
    pub async fn build(self) -> Result<TestHarness, VaultError> {
        let mut config = CreatorVaultConfig::default();

        let mut memory_bulk = None;
        let mut database = None;
        let mut temp_dir = None;
        let (kv, bulk) = if self.in_memory {
            let store = Arc::new(MemoryBulkStore::new());
            memory_bulk = Some(store.clone());
            let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryKeyValueStore::new());
            let bulk: Arc<dyn BulkDataStore> = store;
            (kv, bulk)
        } else {
            let dir = tempfile::TempDir::new().map_err(VaultError::storage)?;
            let db_path = dir.path().join("test.db").display().to_string();
            config.storage = StorageConfig {
                database_path: db_path.clone(),
                wal_mode: true,
            };
            let db = Database::open(&db_path, true).await?;
            let kv: Arc<dyn KeyValueStore> = Arc::new(db.kv_store());
            let bulk: Arc<dyn BulkDataStore> = Arc::new(db.bulk_store());
            database = Some(db);
            temp_dir = Some(dir);
            (kv, bulk)
        };

        let iterations = NonZeroU32::new(self.iterations)
            .ok_or_else(|| VaultError::Internal("iterations must be non-zero".to_string()))?;
        let kdf = Kdf::with_iterations(iterations);
        let mut manager = VaultManager::open_with_kdf(kv.clone(), kdf).await?;

        let session_key = match self.password {
            Some(password) => Some(manager.setup(&secret(&password)).await?),
            None => None,
        };
        debug!(in_memory = self.in_memory, "test harness built");

        Ok(TestHarness {
            state_store: EncryptedStateStore::new(kv.clone()),
            exchange: BackupExchange::new(bulk.clone()),
            kv,
            bulk,
            memory_bulk,
            manager,
            session_key,
            config,
            database,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete vault environment over temp storage.
///
/// Models one device: `reload()` simulates an application restart, dropping
/// the session key and re-reading the vault state from storage.
pub struct TestHarness {
    /// Key-value medium holding lock parameters and encrypted state.
    pub kv: Arc<dyn KeyValueStore>,
    /// Bulk-data store used by backup and restore.
    pub bulk: Arc<dyn BulkDataStore>,
    /// The in-memory bulk store when built `with_memory_storage`, for fault injection.
    pub memory_bulk: Option<Arc<MemoryBulkStore>>,
    pub manager: VaultManager,
    pub state_store: EncryptedStateStore,
    pub exchange: BackupExchange,
    /// Key issued by the last setup, unlock or password change.
    pub session_key: Option<VaultKey>,
    pub config: CreatorVaultConfig,
    /// SQLite handle, absent for in-memory harnesses.
    pub database: Option<Database>,
    _temp_dir: Option<tempfile::TempDir>,
}

impl TestHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// The current session key, or [`VaultError::Locked`].
    pub fn key(&self) -> Result<&VaultKey, VaultError> {
        self.session_key.as_ref().ok_or(VaultError::Locked)
    }

    /// Unlock with `password` and keep the returned key.
    pub async fn unlock(&mut self, password: &str) -> Result<(), VaultError> {
        let key = self.manager.unlock(&secret(password)).await?;
        self.session_key = Some(key);
        Ok(())
    }

    /// Set up a fresh vault with `password` and keep the returned key.
    pub async fn setup(&mut self, password: &str) -> Result<(), VaultError> {
        let key = self.manager.setup(&secret(password)).await?;
        self.session_key = Some(key);
        Ok(())
    }

    /// Drop the session key and re-read vault state from storage.
    pub async fn reload(&mut self) -> Result<(), VaultError> {
        self.session_key = None;
        self.manager = VaultManager::open_with_kdf(self.kv.clone(), self.manager.kdf()).await?;
        Ok(())
    }

    /// Replace the records of `category`.
    pub async fn seed(&self, category: Category, records: Vec<Value>) -> Result<(), VaultError> {
        self.bulk.replace_all(category, records).await
    }

    /// Every category's records, keyed by category.
    pub async fn bulk_snapshot(&self) -> Result<BTreeMap<Category, Vec<Value>>, VaultError> {
        let mut snapshot = BTreeMap::new();
        for category in Category::all() {
            snapshot.insert(category, self.bulk.get_all(category).await?);
        }
        Ok(snapshot)
    }
}
