// SPDX-FileCopyrightText: 2026 CreatorVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `creatorvault export` and `creatorvault import` command implementation.
//!
//! Backups are self-describing JSON files. Import first tries the current
//! session key; if the backup was made under another passphrase it asks for
//! that passphrase and derives the key from the salt stored in the file.

use std::path::{Path, PathBuf};

use creatorvault_core::{Category, VaultError};
use creatorvault_vault::{BackupFile, RestoreReport, get_backup_passphrase};

use crate::session::Session;

fn resolve_categories(session: &Session, categories: &[Category]) -> Vec<Category> {
    if categories.is_empty() {
        session.config.backup.default_categories.clone()
    } else {
        categories.to_vec()
    }
}

fn default_backup_path(directory: &str) -> PathBuf {
    let stamp = chrono::Utc::now().format("%Y%m%d-%H%M%S");
    Path::new(directory).join(format!("creatorvault-backup-{stamp}.json"))
}

/// Export the selected categories to a backup file and return its path.
pub async fn run_export(
    session: &mut Session,
    categories: &[Category],
    out: Option<PathBuf>,
) -> Result<PathBuf, VaultError> {
    let categories = resolve_categories(session, categories);
    let key = session.unlock().await?;
    let file = session
        .exchange
        .export(&session.manager, &categories, &key)
        .await?;

    let path = out.unwrap_or_else(|| default_backup_path(&session.config.backup.directory));
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(VaultError::storage)?;
    }
    std::fs::write(&path, file.to_json_pretty()?).map_err(VaultError::storage)?;

    eprintln!(
        "Backup of {} categor{} written to {}",
        categories.len(),
        if categories.len() == 1 { "y" } else { "ies" },
        path.display()
    );
    Ok(path)
}

/// Restore the selected categories from a backup file.
///
/// When a vault exists the current passphrase is required first. With
/// `ask_backup_password` the backup's own passphrase is used straight away;
/// otherwise it is requested only if the current key does not open the file.
pub async fn run_import(
    session: &mut Session,
    file: &Path,
    categories: &[Category],
    ask_backup_password: bool,
) -> Result<RestoreReport, VaultError> {
    let content = std::fs::read_to_string(file).map_err(VaultError::storage)?;
    let backup = BackupFile::from_json(&content)?;
    let categories = resolve_categories(session, categories);

    let current_key = if session.manager.has_vault().await? {
        Some(session.unlock().await?)
    } else {
        None
    };
    let override_password = if ask_backup_password {
        Some(get_backup_passphrase()?)
    } else {
        None
    };

    let first = session
        .exchange
        .restore(
            &mut session.manager,
            &backup,
            current_key.as_ref(),
            override_password.as_ref(),
            &categories,
        )
        .await;
    let report = match first {
        Err(VaultError::PasswordMismatch) if override_password.is_none() => {
            eprintln!("This backup was created with a different passphrase.");
            let backup_password = get_backup_passphrase()?;
            session
                .exchange
                .restore(
                    &mut session.manager,
                    &backup,
                    current_key.as_ref(),
                    Some(&backup_password),
                    &categories,
                )
                .await?
        }
        other => other?,
    };

    print_report(&report);
    Ok(report)
}

fn print_report(report: &RestoreReport) {
    use colored::Colorize;

    for (category, count) in &report.restored {
        eprintln!("  {} {category}: {count} record(s)", "✓".green());
    }
    for category in &report.missing {
        eprintln!("  {} {category}: not in backup, left unchanged", "-".yellow());
    }
    if report.state_reencrypted > 0 {
        eprintln!(
            "  {} {} saved state entr(ies) re-encrypted",
            "✓".green(),
            report.state_reencrypted
        );
    }
    if report.state_discarded > 0 {
        eprintln!(
            "  {} {} saved state entr(ies) could not be carried over and were removed",
            "!".yellow(),
            report.state_discarded
        );
    }
    if report.requires_unlock {
        eprintln!("The vault now uses the backup's passphrase and is locked.");
    }
}
