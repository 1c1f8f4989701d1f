// SPDX-FileCopyrightText: 2026 CreatorVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wiring of storage, vault manager, state store and backup exchange for one
//! CLI invocation.

use std::sync::Arc;

use creatorvault_config::CreatorVaultConfig;
use creatorvault_core::{BulkDataStore, KeyValueStore, VaultError};
use creatorvault_storage::{Database, SqliteBulkStore};
use creatorvault_vault::prompt::passphrase_from_env;
use creatorvault_vault::{
    BackupExchange, EncryptedStateStore, Kdf, VaultKey, VaultManager, get_passphrase,
};
use tracing::debug;

/// Everything a command needs, opened over the configured database.
pub struct Session {
    pub config: CreatorVaultConfig,
    pub database: Database,
    pub manager: VaultManager,
    pub state_store: EncryptedStateStore,
    pub exchange: BackupExchange,
    pub bulk: Arc<SqliteBulkStore>,
}

impl Session {
    pub async fn open(config: CreatorVaultConfig) -> Result<Self, VaultError> {
        Self::open_with_kdf(config, Kdf::default()).await
    }

    pub async fn open_with_kdf(config: CreatorVaultConfig, kdf: Kdf) -> Result<Self, VaultError> {
        let database =
            Database::open(&config.storage.database_path, config.storage.wal_mode).await?;
        let kv: Arc<dyn KeyValueStore> = Arc::new(database.kv_store());
        let bulk = Arc::new(database.bulk_store());
        let sink: Arc<dyn BulkDataStore> = bulk.clone();

        let manager = VaultManager::open_with_kdf(kv.clone(), kdf).await?;
        debug!(state = %manager.state(), "session opened");

        Ok(Self {
            config,
            database,
            manager,
            state_store: EncryptedStateStore::new(kv),
            exchange: BackupExchange::new(sink),
            bulk,
        })
    }

    /// Prompt for the passphrase and unlock, re-prompting after a wrong
    /// passphrase up to `vault.unlock_attempts` times.
    ///
    /// A passphrase from the environment gets a single attempt.
    pub async fn unlock(&mut self) -> Result<VaultKey, VaultError> {
        if !self.manager.has_vault().await? {
            return Err(VaultError::NoVault);
        }

        let attempts = if passphrase_from_env() {
            1
        } else {
            self.config.vault.unlock_attempts.max(1)
        };
        let mut attempt = 1;
        loop {
            let passphrase = get_passphrase()?;
            match self.manager.unlock(&passphrase).await {
                Ok(key) => return Ok(key),
                Err(e) if e.is_password_error() && attempt < attempts => {
                    eprintln!("Invalid passphrase, try again ({attempt}/{attempts}).");
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Flush the WAL before exit.
    pub async fn close(&self) -> Result<(), VaultError> {
        self.database.close().await
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::num::NonZeroU32;

    use creatorvault_vault::VaultState;
    use creatorvault_vault::prompt::PASSPHRASE_ENV_VAR;
    use secrecy::SecretString;
    use serial_test::serial;

    use super::*;

    /// A session over a temp directory with a fast key derivation.
    pub(crate) async fn test_session(dir: &tempfile::TempDir) -> Session {
        let mut config = CreatorVaultConfig::default();
        config.storage.database_path = dir.path().join("cv.db").display().to_string();
        config.backup.directory = dir.path().join("backups").display().to_string();
        let kdf = Kdf::with_iterations(NonZeroU32::new(1_000).unwrap());
        Session::open_with_kdf(config, kdf).await.unwrap()
    }

    pub(crate) fn set_passphrase(value: &str) {
        // SAFETY: test-only env mutation, serialized with #[serial].
        unsafe { std::env::set_var(PASSPHRASE_ENV_VAR, value) };
    }

    pub(crate) fn clear_passphrase() {
        unsafe { std::env::remove_var(PASSPHRASE_ENV_VAR) };
    }

    #[tokio::test]
    #[serial]
    async fn unlock_uses_env_passphrase() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = test_session(&dir).await;
        session
            .manager
            .setup(&SecretString::from("Secret123!".to_string()))
            .await
            .unwrap();
        session.manager.lock();

        set_passphrase("Secret123!");
        let result = session.unlock().await;
        clear_passphrase();

        assert!(result.is_ok());
        assert_eq!(session.manager.state(), VaultState::Unlocked);
    }

    #[tokio::test]
    #[serial]
    async fn wrong_env_passphrase_fails_once() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = test_session(&dir).await;
        session
            .manager
            .setup(&SecretString::from("Secret123!".to_string()))
            .await
            .unwrap();
        session.manager.lock();

        set_passphrase("wrong");
        let result = session.unlock().await;
        clear_passphrase();

        assert!(matches!(result, Err(VaultError::InvalidPassword)));
    }

    #[tokio::test]
    async fn unlock_without_vault_is_no_vault() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = test_session(&dir).await;
        assert!(matches!(session.unlock().await, Err(VaultError::NoVault)));
    }
}
