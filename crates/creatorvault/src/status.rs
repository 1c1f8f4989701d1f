// SPDX-FileCopyrightText: 2026 CreatorVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `creatorvault status` command implementation.
//!
//! Reports the vault state, storage health and record counts. Needs no
//! passphrase: nothing here is decrypted.

use std::collections::BTreeMap;

use creatorvault_core::{BulkDataStore, Category, HealthStatus, VaultError};
use creatorvault_vault::VaultState;
use serde::Serialize;

use crate::session::Session;

/// Structured status output for `--json` mode.
#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub vault: VaultState,
    pub database_path: String,
    pub storage_backend: String,
    pub storage_health: String,
    pub records: BTreeMap<Category, usize>,
}

pub async fn collect_status(session: &Session) -> Result<StatusReport, VaultError> {
    let storage_health = match session.bulk.health_check().await {
        Ok(HealthStatus::Healthy) => "healthy".to_string(),
        Ok(HealthStatus::Degraded(reason)) => format!("degraded: {reason}"),
        Ok(HealthStatus::Unhealthy(reason)) => format!("unhealthy: {reason}"),
        Err(e) => format!("unhealthy: {e}"),
    };

    let mut records = BTreeMap::new();
    for category in Category::all() {
        records.insert(category, session.bulk.count(category).await?);
    }

    Ok(StatusReport {
        vault: session.manager.state(),
        database_path: session.config.storage.database_path.clone(),
        storage_backend: session.bulk.name().to_string(),
        storage_health,
        records,
    })
}

/// Run the `creatorvault status` command.
pub async fn run_status(session: &Session, json: bool) -> Result<(), VaultError> {
    let report = collect_status(session).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    use colored::Colorize;
    let state = match report.vault {
        VaultState::NoVault => "not configured".yellow(),
        VaultState::Locked => "locked".green(),
        VaultState::Unlocked => "unlocked".green(),
    };
    println!("  Vault:    {state}");
    println!("  Database: {}", report.database_path);
    println!(
        "  Storage:  {} ({})",
        report.storage_backend, report.storage_health
    );
    println!("  Records:");
    for (category, count) in &report.records {
        println!("    {:<12} {count}", category.as_str());
    }
    Ok(())
}
