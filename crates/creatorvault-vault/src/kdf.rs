// SPDX-FileCopyrightText: 2026 CreatorVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! PBKDF2-HMAC-SHA256 key derivation from a password.
//!
//! The work factor is fixed at [`PBKDF2_ITERATIONS`]. Backup files do not
//! record it, so every device that exchanges backups must derive with the
//! same count.

use std::num::NonZeroU32;

use creatorvault_core::VaultError;
use ring::pbkdf2;
use ring::rand::{SecureRandom, SystemRandom};
use secrecy::{ExposeSecret, SecretString};
use zeroize::Zeroizing;

/// PBKDF2 iteration count used for every vault key.
pub const PBKDF2_ITERATIONS: u32 = 100_000;

/// Salt length in bytes.
pub const SALT_LEN: usize = 16;

/// Derived key length in bytes (AES-256).
pub const KEY_LEN: usize = 32;

/// A symmetric vault key derived from a password.
///
/// Never persisted. The bytes are zeroed on drop and `Debug` output is redacted.
pub struct VaultKey(Zeroizing<[u8; KEY_LEN]>);

impl VaultKey {
    pub(crate) fn from_bytes(bytes: Zeroizing<[u8; KEY_LEN]>) -> Self {
        Self(bytes)
    }

    pub(crate) fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl std::fmt::Debug for VaultKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("VaultKey([REDACTED])")
    }
}

/// Password-based key derivation with a fixed iteration count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Kdf {
    iterations: NonZeroU32,
}

impl Default for Kdf {
    fn default() -> Self {
        Self {
            iterations: NonZeroU32::new(PBKDF2_ITERATIONS).unwrap_or(NonZeroU32::MIN),
        }
    }
}

impl Kdf {
    /// A derivation with a non-default iteration count.
    ///
    /// Keys derived this way do not unlock vaults created with the default.
    pub fn with_iterations(iterations: NonZeroU32) -> Self {
        Self { iterations }
    }

    pub fn iterations(&self) -> u32 {
        self.iterations.get()
    }

    /// Derive a key from `password` and `salt`. Deterministic for identical inputs.
    pub fn derive(&self, password: &[u8], salt: &[u8]) -> VaultKey {
        let mut out = Zeroizing::new([0u8; KEY_LEN]);
        pbkdf2::derive(
            pbkdf2::PBKDF2_HMAC_SHA256,
            self.iterations,
            salt,
            password,
            &mut out[..],
        );
        VaultKey::from_bytes(out)
    }

    /// Derive on the blocking pool so the async runtime keeps serving other work.
    pub async fn derive_async(
        &self,
        password: &SecretString,
        salt: &[u8],
    ) -> Result<VaultKey, VaultError> {
        let kdf = *self;
        let password = Zeroizing::new(password.expose_secret().as_bytes().to_vec());
        let salt = salt.to_vec();
        tokio::task::spawn_blocking(move || kdf.derive(&password, &salt))
            .await
            .map_err(|e| VaultError::Internal(format!("key derivation task failed: {e}")))
    }
}

/// Generate a random salt for a new vault.
pub fn generate_salt() -> Result<[u8; SALT_LEN], VaultError> {
    let rng = SystemRandom::new();
    let mut salt = [0u8; SALT_LEN];
    rng.fill(&mut salt)
        .map_err(|_| VaultError::Internal("failed to generate random salt".to_string()))?;
    Ok(salt)
}
