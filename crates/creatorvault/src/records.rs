// SPDX-FileCopyrightText: 2026 CreatorVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `creatorvault records` subcommands over the bulk-data store.

use std::path::Path;

use creatorvault_core::{BulkDataStore, Category, VaultError};
use serde_json::Value;

use crate::session::Session;

/// Print every record of `category` as a JSON array.
pub async fn run_list(session: &mut Session, category: Category) -> Result<(), VaultError> {
    session.unlock().await?;
    let records = session.bulk.get_all(category).await?;
    println!("{}", serde_json::to_string_pretty(&records)?);
    Ok(())
}

/// Replace `category` with the JSON array in `file`.
pub async fn run_put(
    session: &mut Session,
    category: Category,
    file: &Path,
) -> Result<(), VaultError> {
    let records = read_records(file)?;
    session.unlock().await?;
    let count = records.len();
    session.bulk.replace_all(category, records).await?;
    eprintln!("stored {count} record(s) in {category}");
    Ok(())
}

fn read_records(file: &Path) -> Result<Vec<Value>, VaultError> {
    let content = std::fs::read_to_string(file).map_err(VaultError::storage)?;
    Ok(serde_json::from_str(&content)?)
}
