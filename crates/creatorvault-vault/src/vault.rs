// SPDX-FileCopyrightText: 2026 CreatorVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vault lifecycle: setup, unlock, password change, and factory reset.
//!
//! The vault is protected by its lock parameters: a random salt and a
//! verifier, which is the literal `VALID` sealed under the key derived from
//! the password and that salt. A candidate password is checked by deriving a
//! key and opening the verifier, so no application data is ever decrypted to
//! test a password.
//!
//! The two parameters live under fixed keys in the key-value medium and are
//! always written and removed together in one atomic step.

use std::sync::Arc;

use creatorvault_core::{KeyValueStore, VaultError};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::crypto::{self, NONCE_LEN, SealedBytes, TAG_LEN};
use crate::kdf::{self, Kdf, VaultKey};

/// Storage key holding the salt as a JSON byte array.
pub const SALT_KEY: &str = "vault_salt";

/// Storage key holding the verifier as a JSON [`SealedBytes`] object.
pub const VERIFIER_KEY: &str = "vault_verifier";

/// The fixed plaintext sealed into the verifier.
pub const VERIFIER_PLAINTEXT: &[u8] = b"VALID";

/// Whether `key` is one of the reserved lock-parameter keys.
pub fn is_reserved_key(key: &str) -> bool {
    key == SALT_KEY || key == VERIFIER_KEY
}

/// The salt and verifier pair that protects a vault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockParameters {
    pub salt: Vec<u8>,
    pub verifier: SealedBytes,
}

impl LockParameters {
    /// Seal a fresh verifier for `key`, which must have been derived from `salt`.
    pub fn seal(key: &VaultKey, salt: Vec<u8>) -> Result<Self, VaultError> {
        Ok(Self {
            salt,
            verifier: crypto::seal(key, VERIFIER_PLAINTEXT)?,
        })
    }

    /// Check the shape of the parameters without any key.
    pub fn validate(&self) -> Result<(), VaultError> {
        if self.salt.is_empty() {
            return Err(VaultError::Format("salt is empty".to_string()));
        }
        if self.verifier.iv.len() != NONCE_LEN {
            return Err(VaultError::Format(format!(
                "verifier iv must be {NONCE_LEN} bytes, found {}",
                self.verifier.iv.len()
            )));
        }
        if self.verifier.data.len() < TAG_LEN {
            return Err(VaultError::Format("verifier data is truncated".to_string()));
        }
        Ok(())
    }

    /// Whether `key` opens the verifier to exactly [`VERIFIER_PLAINTEXT`].
    ///
    /// A wrong key and a corrupted verifier both return `false`.
    pub fn verifies(&self, key: &VaultKey) -> bool {
        match crypto::open(key, &self.verifier) {
            Ok(plaintext) => plaintext.as_slice() == VERIFIER_PLAINTEXT,
            Err(_) => false,
        }
    }

    fn to_entries(&self) -> Result<Vec<(String, String)>, VaultError> {
        Ok(vec![
            (SALT_KEY.to_string(), serde_json::to_string(&self.salt)?),
            (
                VERIFIER_KEY.to_string(),
                serde_json::to_string(&self.verifier)?,
            ),
        ])
    }

    fn from_raw(salt: &str, verifier: &str) -> Result<Self, VaultError> {
        let salt = serde_json::from_str(salt)
            .map_err(|e| VaultError::Format(format!("stored salt is malformed: {e}")))?;
        let verifier = serde_json::from_str(verifier)
            .map_err(|e| VaultError::Format(format!("stored verifier is malformed: {e}")))?;
        Ok(Self { salt, verifier })
    }
}

/// Lifecycle state of a [`VaultManager`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VaultState {
    /// No lock parameters exist.
    NoVault,
    /// Lock parameters exist and no session key has been issued.
    Locked,
    /// A session key was issued by setup or unlock.
    Unlocked,
}

impl VaultState {
    pub fn as_str(&self) -> &'static str {
        match self {
            VaultState::NoVault => "no_vault",
            VaultState::Locked => "locked",
            VaultState::Unlocked => "unlocked",
        }
    }
}

impl std::fmt::Display for VaultState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pending changes to the encrypted state for a switch of vault key.
///
/// Built by [`VaultManager::prepare_rekey`] and applied by
/// [`VaultManager::install_lock_parameters`].
#[derive(Debug, Default)]
pub struct StateRekey {
    reencrypted: Vec<(String, String)>,
    discarded: Vec<String>,
}

impl StateRekey {
    /// Number of entries carried over under the new key.
    pub fn reencrypted(&self) -> usize {
        self.reencrypted.len()
    }

    /// Number of entries that will be removed.
    pub fn discarded(&self) -> usize {
        self.discarded.len()
    }
}

/// Owns the vault state machine over an injected key-value medium.
///
/// The manager never holds the session key. `setup`, `unlock` and
/// `change_password` hand the key to the caller, who passes it explicitly to
/// the state store and backup exchange.
pub struct VaultManager {
    store: Arc<dyn KeyValueStore>,
    kdf: Kdf,
    state: VaultState,
}

impl std::fmt::Debug for VaultManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultManager")
            .field("kdf", &self.kdf)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl VaultManager {
    /// Create a manager with the default key derivation, reading the initial
    /// state from storage.
    pub async fn open(store: Arc<dyn KeyValueStore>) -> Result<Self, VaultError> {
        Self::open_with_kdf(store, Kdf::default()).await
    }

    /// Create a manager with a specific key derivation.
    pub async fn open_with_kdf(
        store: Arc<dyn KeyValueStore>,
        kdf: Kdf,
    ) -> Result<Self, VaultError> {
        let mut manager = Self {
            store,
            kdf,
            state: VaultState::NoVault,
        };
        if manager.has_vault().await? {
            manager.state = VaultState::Locked;
        }
        debug!(state = %manager.state, "vault manager opened");
        Ok(manager)
    }

    pub fn state(&self) -> VaultState {
        self.state
    }

    pub fn kdf(&self) -> Kdf {
        self.kdf
    }

    /// True iff both lock parameters are present.
    pub async fn has_vault(&self) -> Result<bool, VaultError> {
        let salt = self.store.get(SALT_KEY).await?;
        let verifier = self.store.get(VERIFIER_KEY).await?;
        Ok(salt.is_some() && verifier.is_some())
    }

    /// Read the stored lock parameters, or `None` when no vault is configured.
    pub async fn lock_parameters(&self) -> Result<Option<LockParameters>, VaultError> {
        let salt = self.store.get(SALT_KEY).await?;
        let verifier = self.store.get(VERIFIER_KEY).await?;
        match (salt, verifier) {
            (Some(salt), Some(verifier)) => LockParameters::from_raw(&salt, &verifier).map(Some),
            _ => Ok(None),
        }
    }

    /// Create a new vault protected by `password` and return its key.
    ///
    /// Fails with [`VaultError::VaultExists`] if lock parameters are already
    /// present; an existing vault is never overwritten.
    pub async fn setup(&mut self, password: &SecretString) -> Result<VaultKey, VaultError> {
        if self.has_vault().await? {
            return Err(VaultError::VaultExists);
        }

        let salt = kdf::generate_salt()?;
        let key = self.kdf.derive_async(password, &salt).await?;
        let params = LockParameters::seal(&key, salt.to_vec())?;
        self.store.set_many(&params.to_entries()?).await?;

        self.state = VaultState::Unlocked;
        info!("vault created");
        Ok(key)
    }

    /// Unlock the vault with `password` and return the session key.
    ///
    /// A wrong password and a corrupted verifier both fail with
    /// [`VaultError::InvalidPassword`] and leave the state unchanged.
    pub async fn unlock(&mut self, password: &SecretString) -> Result<VaultKey, VaultError> {
        let Some(params) = self.load_for_check().await? else {
            self.state = VaultState::NoVault;
            return Err(VaultError::NoVault);
        };

        let key = self.kdf.derive_async(password, &params.salt).await?;
        if !params.verifies(&key) {
            warn!("unlock rejected: invalid password");
            return Err(VaultError::InvalidPassword);
        }

        self.state = VaultState::Unlocked;
        info!("vault unlocked");
        Ok(key)
    }

    /// Check `password` against the verifier without changing state.
    pub async fn verify_password(&self, password: &SecretString) -> Result<bool, VaultError> {
        let Some(params) = self.load_for_check().await? else {
            return Err(VaultError::NoVault);
        };
        let key = self.kdf.derive_async(password, &params.salt).await?;
        Ok(params.verifies(&key))
    }

    /// Confirm `key` opens the current verifier and return the lock parameters.
    pub async fn authorize(&self, key: &VaultKey) -> Result<LockParameters, VaultError> {
        let Some(params) = self.load_for_check().await? else {
            return Err(VaultError::NoVault);
        };
        if !params.verifies(key) {
            return Err(VaultError::InvalidPassword);
        }
        Ok(params)
    }

    /// Drop back to `Locked`. The caller discards its key.
    pub fn lock(&mut self) {
        if self.state == VaultState::Unlocked {
            self.state = VaultState::Locked;
            info!("vault locked");
        }
    }

    /// Re-key the vault under `new_password` and return the new key.
    ///
    /// Every encrypted entry in the medium is re-encrypted under the new key
    /// and written together with the new lock parameters in one atomic step.
    /// Unprefixed entries are left as they are. If any entry fails to decrypt
    /// nothing is written.
    pub async fn change_password(
        &mut self,
        current_key: &VaultKey,
        new_password: &SecretString,
    ) -> Result<VaultKey, VaultError> {
        if self.state != VaultState::Unlocked {
            return Err(VaultError::Locked);
        }
        self.authorize(current_key).await?;

        let salt = kdf::generate_salt()?;
        let new_key = self.kdf.derive_async(new_password, &salt).await?;

        let mut entries = Vec::new();
        for (key, raw) in self.encrypted_entries().await? {
            let value: Value = crypto::decrypt_json(&raw, current_key)?;
            entries.push((key, crypto::encrypt_json(&value, &new_key)?));
        }
        let reencrypted = entries.len();

        let params = LockParameters::seal(&new_key, salt.to_vec())?;
        entries.extend(params.to_entries()?);
        self.store.set_many(&entries).await?;

        info!(entries = reencrypted, "vault password changed");
        Ok(new_key)
    }

    /// Destroy the lock parameters and every stored value.
    ///
    /// Irreversible. There is no other recovery from a forgotten password.
    pub async fn reset_vault(&mut self) -> Result<(), VaultError> {
        self.store
            .remove_many(&[SALT_KEY.to_string(), VERIFIER_KEY.to_string()])
            .await?;
        self.store.clear().await?;
        self.state = VaultState::NoVault;
        info!("vault reset");
        Ok(())
    }

    /// Work out how the encrypted state follows a switch to `new_key`.
    ///
    /// With a `current_key` that opens the current verifier, every encrypted
    /// entry is re-encrypted under `new_key`. Without one the entries cannot
    /// be read again after the switch and are marked for removal. Nothing is
    /// written here; an entry that fails to decrypt aborts the plan.
    pub async fn prepare_rekey(
        &self,
        current_key: Option<&VaultKey>,
        new_key: &VaultKey,
    ) -> Result<StateRekey, VaultError> {
        let entries = self.encrypted_entries().await?;
        let has_vault = self.has_vault().await?;
        let current_key = match current_key {
            Some(key) if has_vault => {
                self.authorize(key).await?;
                key
            }
            _ => {
                return Ok(StateRekey {
                    reencrypted: Vec::new(),
                    discarded: entries.into_iter().map(|(key, _)| key).collect(),
                });
            }
        };

        let mut reencrypted = Vec::with_capacity(entries.len());
        for (key, raw) in entries {
            let value: Value = crypto::decrypt_json(&raw, current_key)?;
            reencrypted.push((key, crypto::encrypt_json(&value, new_key)?));
        }
        Ok(StateRekey {
            reencrypted,
            discarded: Vec::new(),
        })
    }

    /// Replace the lock parameters and drop to `Locked`.
    ///
    /// Entries re-encrypted by `rekey` are written in the same atomic step as
    /// the parameters. Entries it discards are removed first. Any key issued
    /// before this call may no longer match; the caller must unlock again.
    pub async fn install_lock_parameters(
        &mut self,
        params: &LockParameters,
        rekey: StateRekey,
    ) -> Result<(), VaultError> {
        params.validate()?;
        let StateRekey {
            reencrypted: mut entries,
            discarded,
        } = rekey;

        if !discarded.is_empty() {
            warn!(
                entries = discarded.len(),
                "discarding state sealed under a key that was not supplied"
            );
            self.store.remove_many(&discarded).await?;
        }
        let carried = entries.len();
        entries.extend(params.to_entries()?);
        self.store.set_many(&entries).await?;

        self.state = VaultState::Locked;
        info!(entries = carried, "vault lock parameters replaced");
        Ok(())
    }

    /// Every non-reserved entry holding vault data, with its raw value.
    async fn encrypted_entries(&self) -> Result<Vec<(String, String)>, VaultError> {
        let mut entries = Vec::new();
        for key in self.store.keys().await? {
            if is_reserved_key(&key) {
                continue;
            }
            if let Some(raw) = self.store.get(&key).await?
                && crypto::is_encrypted(&raw)
            {
                entries.push((key, raw));
            }
        }
        Ok(entries)
    }

    /// Load parameters for a password check. Unreadable parameters are
    /// reported as an invalid password so a corrupted verifier and a wrong
    /// password look the same.
    async fn load_for_check(&self) -> Result<Option<LockParameters>, VaultError> {
        match self.lock_parameters().await {
            Ok(params) => Ok(params),
            Err(VaultError::Format(detail)) => {
                debug!(%detail, "stored lock parameters unreadable");
                Err(VaultError::InvalidPassword)
            }
            Err(e) => Err(e),
        }
    }
}
