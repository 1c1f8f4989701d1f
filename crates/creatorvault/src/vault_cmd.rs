// SPDX-FileCopyrightText: 2026 CreatorVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `creatorvault init`, `unlock`, `passwd` and `reset` commands.

use colored::Colorize;
use creatorvault_core::{BulkDataStore, Category, VaultError};
use creatorvault_vault::{get_new_passphrase, get_replacement_passphrase};

use crate::session::Session;

/// Create a vault with a confirmed passphrase.
pub async fn run_init(session: &mut Session) -> Result<(), VaultError> {
    if session.manager.has_vault().await? {
        return Err(VaultError::VaultExists);
    }
    let passphrase = get_new_passphrase(session.config.vault.min_passphrase_length)?;
    session.manager.setup(&passphrase).await?;

    eprintln!("{} vault created", "✓".green());
    eprintln!(
        "  There is no password recovery. Keep an exported backup somewhere safe."
    );
    Ok(())
}

/// Check the passphrase against the vault.
pub async fn run_unlock(session: &mut Session) -> Result<(), VaultError> {
    session.unlock().await?;
    eprintln!("{} passphrase accepted", "✓".green());
    Ok(())
}

/// Change the vault passphrase, re-encrypting stored state.
pub async fn run_passwd(session: &mut Session) -> Result<(), VaultError> {
    let key = session.unlock().await?;
    let replacement = get_replacement_passphrase(session.config.vault.min_passphrase_length)?;
    session.manager.change_password(&key, &replacement).await?;

    eprintln!("{} passphrase changed", "✓".green());
    eprintln!("  Backups exported earlier still open with the old passphrase.");
    Ok(())
}

/// Destroy the vault and every stored record.
pub async fn run_reset(session: &mut Session) -> Result<(), VaultError> {
    session.manager.reset_vault().await?;
    for category in Category::all() {
        session.bulk.replace_all(category, Vec::new()).await?;
    }
    eprintln!("{} vault and all stored data removed", "✓".green());
    Ok(())
}
