// SPDX-FileCopyrightText: 2026 CreatorVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Password-protected encrypted storage for CreatorVault.
//!
//! A password and a random salt derive an AES-256 key (PBKDF2-HMAC-SHA256).
//! The key never touches disk: the vault stores only the salt and a verifier,
//! and every piece of application state is written as an authenticated
//! AES-256-GCM blob. Backups carry a copy of the lock parameters so they can
//! be restored on another device or after a password change.

pub mod backup;
pub mod crypto;
pub mod kdf;
pub mod prompt;
pub mod store;
pub mod vault;

pub use backup::{BACKUP_VERSION, BackupExchange, BackupFile, RestoreReport};
pub use kdf::{Kdf, VaultKey};
pub use prompt::{
    get_backup_passphrase, get_new_passphrase, get_passphrase, get_replacement_passphrase,
};
pub use store::EncryptedStateStore;
pub use vault::{LockParameters, StateRekey, VaultManager, VaultState};
