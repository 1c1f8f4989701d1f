// SPDX-FileCopyrightText: 2026 CreatorVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! AES-256-GCM seal/open and the two on-disk ciphertext encodings.
//!
//! Every call to [`seal`] generates a fresh random 96-bit nonce via the system
//! CSPRNG. Nonce reuse would be catastrophic for GCM security.
//!
//! Ciphertexts are persisted in one of two shapes:
//! - an encrypted blob string, `ENC_V1:` followed by standard base64 of
//!   `nonce || ciphertext || tag`, used for all application state and the
//!   backup payload;
//! - [`SealedBytes`], the nonce and ciphertext as JSON byte arrays, used for
//!   the vault verifier.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use creatorvault_core::VaultError;
use ring::aead::{AES_256_GCM, Aad, LessSafeKey, Nonce, UnboundKey};
use ring::rand::{SecureRandom, SystemRandom};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::kdf::VaultKey;

/// Format tag every encrypted blob starts with.
pub const BLOB_PREFIX: &str = "ENC_V1:";

/// AES-GCM nonce length in bytes.
pub const NONCE_LEN: usize = 12;

/// AES-GCM authentication tag length in bytes.
pub const TAG_LEN: usize = 16;

/// A nonce and its ciphertext (tag appended), serialized as byte arrays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SealedBytes {
    pub iv: Vec<u8>,
    pub data: Vec<u8>,
}

fn aead_key(key: &VaultKey) -> Result<LessSafeKey, VaultError> {
    let unbound = UnboundKey::new(&AES_256_GCM, key.as_bytes())
        .map_err(|_| VaultError::Internal("failed to create AES-256-GCM key".to_string()))?;
    Ok(LessSafeKey::new(unbound))
}

/// Encrypt `plaintext` under `key` with a random nonce.
pub fn seal(key: &VaultKey, plaintext: &[u8]) -> Result<SealedBytes, VaultError> {
    let less_safe = aead_key(key)?;

    let rng = SystemRandom::new();
    let mut nonce_bytes = [0u8; NONCE_LEN];
    rng.fill(&mut nonce_bytes)
        .map_err(|_| VaultError::Internal("failed to generate random nonce".to_string()))?;
    let nonce = Nonce::assume_unique_for_key(nonce_bytes);

    let mut in_out = plaintext.to_vec();
    less_safe
        .seal_in_place_append_tag(nonce, Aad::empty(), &mut in_out)
        .map_err(|_| VaultError::Internal("AES-256-GCM encryption failed".to_string()))?;

    Ok(SealedBytes {
        iv: nonce_bytes.to_vec(),
        data: in_out,
    })
}

/// Decrypt a [`SealedBytes`] value.
///
/// A nonce of the wrong length is a [`VaultError::Format`]; any tag failure
/// (wrong key or tampered bytes) is [`VaultError::Decrypt`].
pub fn open(key: &VaultKey, sealed: &SealedBytes) -> Result<Zeroizing<Vec<u8>>, VaultError> {
    let nonce = Nonce::try_assume_unique_for_key(&sealed.iv)
        .map_err(|_| VaultError::Format(format!("nonce must be {NONCE_LEN} bytes")))?;
    let less_safe = aead_key(key)?;

    let mut in_out = Zeroizing::new(sealed.data.clone());
    let plaintext = less_safe
        .open_in_place(nonce, Aad::empty(), &mut in_out)
        .map_err(|_| VaultError::Decrypt)?;

    Ok(Zeroizing::new(plaintext.to_vec()))
}

/// Whether `raw` carries the encrypted-blob prefix.
///
/// Anything else is legacy or foreign data and must not be trusted.
pub fn is_encrypted(raw: &str) -> bool {
    raw.starts_with(BLOB_PREFIX)
}

/// Serialize `value` to JSON and encrypt it into a prefixed blob string.
pub fn encrypt_json<T>(value: &T, key: &VaultKey) -> Result<String, VaultError>
where
    T: Serialize + ?Sized,
{
    let json = Zeroizing::new(serde_json::to_vec(value)?);
    let sealed = seal(key, &json)?;

    let mut body = sealed.iv;
    body.extend_from_slice(&sealed.data);
    Ok(format!("{BLOB_PREFIX}{}", STANDARD.encode(body)))
}

/// Decrypt a prefixed blob string and parse the recovered JSON.
pub fn decrypt_json<T>(blob: &str, key: &VaultKey) -> Result<T, VaultError>
where
    T: DeserializeOwned,
{
    let encoded = blob
        .strip_prefix(BLOB_PREFIX)
        .ok_or_else(|| VaultError::Format("missing encryption prefix".to_string()))?;
    let body = STANDARD
        .decode(encoded)
        .map_err(|e| VaultError::Format(format!("invalid base64 body: {e}")))?;
    if body.len() < NONCE_LEN + TAG_LEN {
        return Err(VaultError::Format("encrypted body is truncated".to_string()));
    }

    let (iv, data) = body.split_at(NONCE_LEN);
    let sealed = SealedBytes {
        iv: iv.to_vec(),
        data: data.to_vec(),
    };
    let plaintext = open(key, &sealed)?;

    serde_json::from_slice(&plaintext)
        .map_err(|e| VaultError::Format(format!("decrypted data is not valid JSON: {e}")))
}
