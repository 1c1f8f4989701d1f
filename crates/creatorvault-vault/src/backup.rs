// SPDX-FileCopyrightText: 2026 CreatorVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Portable backup files and the export/restore protocol.
//!
//! A backup carries a copy of the exporting vault's lock parameters next to
//! an encrypted snapshot of the selected categories. Both are under the same
//! key, so a candidate password can be checked against `security` before the
//! payload or any local state is touched.
//!
//! ```json
//! {
//!   "version": 1,
//!   "timestamp": 1767225600000,
//!   "security": { "salt": [..], "verifier": { "iv": [..], "data": [..] } },
//!   "payload": "ENC_V1:..."
//! }
//! ```

use std::collections::BTreeSet;
use std::sync::Arc;

use creatorvault_core::{BulkDataStore, Category, VaultError};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::crypto;
use crate::kdf::VaultKey;
use crate::vault::{LockParameters, VaultManager};

/// Current backup file format version.
pub const BACKUP_VERSION: u32 = 1;

/// The on-disk backup document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupFile {
    pub version: u32,
    /// Creation time in milliseconds since the Unix epoch.
    #[serde(default)]
    pub timestamp: i64,
    pub security: LockParameters,
    pub payload: String,
}

impl BackupFile {
    /// Parse and structurally validate a backup document.
    pub fn from_json(json: &str) -> Result<Self, VaultError> {
        let file: Self = serde_json::from_str(json)
            .map_err(|e| VaultError::InvalidBackupFormat(e.to_string()))?;
        file.validate()?;
        Ok(file)
    }

    pub fn to_json_pretty(&self) -> Result<String, VaultError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check the fields that can be checked without a key.
    pub fn validate(&self) -> Result<(), VaultError> {
        if self.version == 0 || self.version > BACKUP_VERSION {
            return Err(VaultError::InvalidBackupFormat(format!(
                "unsupported version {}",
                self.version
            )));
        }
        self.security
            .validate()
            .map_err(|e| VaultError::InvalidBackupFormat(format!("security: {e}")))?;
        if !crypto::is_encrypted(&self.payload) {
            return Err(VaultError::InvalidBackupFormat(
                "payload is not vault data".to_string(),
            ));
        }
        Ok(())
    }
}

/// Outcome of a successful restore.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoreReport {
    /// Categories written, with their record counts.
    pub restored: Vec<(Category, usize)>,
    /// Requested categories the backup does not contain. Left untouched.
    pub missing: Vec<Category>,
    /// Encrypted state entries carried over to the backup's key.
    pub state_reencrypted: usize,
    /// Encrypted state entries removed because no current key was supplied.
    pub state_discarded: usize,
    /// Always true: the lock parameters were replaced and the session key
    /// held before the restore may no longer be valid.
    pub requires_unlock: bool,
}

/// Snapshots and restores bulk data through portable backup files.
pub struct BackupExchange {
    bulk: Arc<dyn BulkDataStore>,
}

impl BackupExchange {
    pub fn new(bulk: Arc<dyn BulkDataStore>) -> Self {
        Self { bulk }
    }

    /// Export `categories` under `vault_key`.
    ///
    /// The key must open the current verifier. Unselected categories are
    /// absent from the payload.
    pub async fn export(
        &self,
        manager: &VaultManager,
        categories: &[Category],
        vault_key: &VaultKey,
    ) -> Result<BackupFile, VaultError> {
        let security = manager.authorize(vault_key).await?;

        let mut snapshot = Map::new();
        for category in dedup(categories) {
            let records = self.bulk.get_all(category).await?;
            debug!(%category, records = records.len(), "category exported");
            snapshot.insert(category.as_str().to_string(), Value::Array(records));
        }
        let exported = snapshot.len();
        let payload = crypto::encrypt_json(&Value::Object(snapshot), vault_key)?;

        info!(categories = exported, "backup exported");
        Ok(BackupFile {
            version: BACKUP_VERSION,
            timestamp: chrono::Utc::now().timestamp_millis(),
            security,
            payload,
        })
    }

    /// Restore `categories` from `file`.
    ///
    /// With `override_password` the key is derived from that password and the
    /// salt embedded in the backup; otherwise `current_key` is used. A key
    /// that does not open the backup fails with
    /// [`VaultError::PasswordMismatch`] before anything is written.
    ///
    /// On success the device's lock parameters are replaced by the backup's
    /// and `manager` drops to `Locked`. The caller must discard any key it
    /// holds and unlock again with the backup's password.
    ///
    /// Encrypted state saved on this device is re-encrypted from
    /// `current_key` to the backup's key in the same write that installs the
    /// new lock parameters. Without a `current_key` that state cannot be
    /// carried over and is removed. A `current_key` that does not open this
    /// device's vault fails with [`VaultError::InvalidPassword`] before
    /// anything is written.
    pub async fn restore(
        &self,
        manager: &mut VaultManager,
        file: &BackupFile,
        current_key: Option<&VaultKey>,
        override_password: Option<&SecretString>,
        categories: &[Category],
    ) -> Result<RestoreReport, VaultError> {
        file.validate()?;

        let derived;
        let key = match override_password {
            Some(password) => {
                derived = manager
                    .kdf()
                    .derive_async(password, &file.security.salt)
                    .await?;
                &derived
            }
            None => current_key.ok_or(VaultError::PasswordMismatch)?,
        };

        if !file.security.verifies(key) {
            warn!("backup rejected: password does not match");
            return Err(VaultError::PasswordMismatch);
        }
        let snapshot: Value = crypto::decrypt_json(&file.payload, key).map_err(|e| match e {
            VaultError::Decrypt => VaultError::PasswordMismatch,
            VaultError::Format(detail) => VaultError::InvalidBackupFormat(detail),
            other => other,
        })?;
        let Value::Object(mut snapshot) = snapshot else {
            return Err(VaultError::InvalidBackupFormat(
                "payload is not an object".to_string(),
            ));
        };

        // Check every requested category before the first write.
        let mut planned = Vec::new();
        let mut missing = Vec::new();
        for category in dedup(categories) {
            match snapshot.remove(category.as_str()) {
                Some(Value::Array(records)) => planned.push((category, records)),
                Some(_) => {
                    return Err(VaultError::InvalidBackupFormat(format!(
                        "category `{category}` is not an array"
                    )));
                }
                None => missing.push(category),
            }
        }

        let rekey = manager.prepare_rekey(current_key, key).await?;
        let state_reencrypted = rekey.reencrypted();
        let state_discarded = rekey.discarded();

        let mut restored = Vec::with_capacity(planned.len());
        for (category, records) in planned {
            let count = records.len();
            self.bulk.replace_all(category, records).await?;
            debug!(%category, records = count, "category restored");
            restored.push((category, count));
        }

        manager.install_lock_parameters(&file.security, rekey).await?;

        info!(
            restored = restored.len(),
            missing = missing.len(),
            state_reencrypted,
            state_discarded,
            "backup restored"
        );
        Ok(RestoreReport {
            restored,
            missing,
            state_reencrypted,
            state_discarded,
            requires_unlock: true,
        })
    }
}

fn dedup(categories: &[Category]) -> BTreeSet<Category> {
    categories.iter().copied().collect()
}
