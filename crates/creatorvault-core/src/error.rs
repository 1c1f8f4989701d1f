// SPDX-FileCopyrightText: 2026 CreatorVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for CreatorVault.
//!
//! A wrong password and a corrupted ciphertext produce the same variant.

use thiserror::Error;

/// The primary error type used across all CreatorVault crates.
#[derive(Debug, Error)]
pub enum VaultError {
    /// Data presented for decryption is not vault data (missing prefix,
    /// undecodable body, or a plaintext that is not JSON).
    #[error("not vault data: {0}")]
    Format(String),

    /// Authentication tag verification failed.
    #[error("decryption failed -- wrong key or corrupted data")]
    Decrypt,

    /// The password does not unlock the configured vault.
    #[error("invalid password")]
    InvalidPassword,

    /// The operation requires a configured vault but none exists.
    #[error("no vault is configured -- run setup first")]
    NoVault,

    /// Setup was attempted on a device that already has a vault.
    #[error("a vault is already configured on this device")]
    VaultExists,

    /// The operation requires an unlocked session.
    #[error("vault is locked")]
    Locked,

    /// A backup file is malformed or missing required fields.
    #[error("invalid backup file: {0}")]
    InvalidBackupFormat(String),

    /// The backup was encrypted under a different password than the one supplied.
    #[error("backup password does not match -- provide the password the backup was created with")]
    PasswordMismatch,

    /// A new passphrase does not meet the configured policy.
    #[error("passphrase must be at least {min_length} characters")]
    WeakPassphrase { min_length: usize },

    /// No passphrase could be obtained from the environment or a terminal.
    #[error("passphrase unavailable: {0}")]
    PassphraseUnavailable(String),

    /// Key-value medium or bulk-data sink failure, propagated unchanged.
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A value could not be serialized to JSON before encryption.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl VaultError {
    /// Wrap any error as a storage failure.
    pub fn storage<E>(source: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::Storage {
            source: source.into(),
        }
    }

    /// Whether retrying with a different password could succeed.
    pub fn is_password_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidPassword | Self::PasswordMismatch | Self::Decrypt
        )
    }
}
