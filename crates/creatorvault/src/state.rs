// SPDX-FileCopyrightText: 2026 CreatorVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `creatorvault state` subcommands over the encrypted state store.

use creatorvault_core::VaultError;
use serde_json::Value;

use crate::session::Session;

/// Print the decrypted value under `key`, or `null` when nothing usable is stored.
pub async fn run_get(session: &mut Session, key: &str) -> Result<(), VaultError> {
    let vault_key = session.unlock().await?;
    let value: Option<Value> = session.state_store.load(key, &vault_key).await?;
    match value {
        Some(value) => println!("{}", serde_json::to_string_pretty(&value)?),
        None => {
            eprintln!("no value stored under `{key}`");
            println!("null");
        }
    }
    Ok(())
}

/// Encrypt and store `json` under `key`, replacing any previous value.
pub async fn run_set(session: &mut Session, key: &str, json: &str) -> Result<(), VaultError> {
    let value: Value = serde_json::from_str(json)?;
    let vault_key = session.unlock().await?;
    session.state_store.save(key, &value, &vault_key).await?;
    eprintln!("saved `{key}`");
    Ok(())
}

pub async fn run_rm(session: &mut Session, key: &str) -> Result<(), VaultError> {
    session.state_store.remove(key).await?;
    eprintln!("removed `{key}`");
    Ok(())
}
