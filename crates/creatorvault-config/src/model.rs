// SPDX-FileCopyrightText: 2026 CreatorVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for CreatorVault.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use creatorvault_core::Category;
use serde::{Deserialize, Serialize};

/// Top-level CreatorVault configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CreatorVaultConfig {
    /// Application-wide settings.
    #[serde(default)]
    pub app: AppConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Vault unlock and passphrase policy.
    #[serde(default)]
    pub vault: VaultConfig,

    /// Backup export/import settings.
    #[serde(default)]
    pub backup: BackupConfig,
}

/// Application-wide configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("creatorvault").join("creatorvault.db"))
        .unwrap_or_else(|| "creatorvault.db".into())
        .display()
        .to_string()
}

fn default_wal_mode() -> bool {
    true
}

/// Vault passphrase policy.
///
/// The key derivation work factor is deliberately absent: it is part of the
/// on-disk format and cannot vary per installation.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct VaultConfig {
    /// Minimum passphrase length accepted when creating or changing a passphrase.
    #[serde(default = "default_min_passphrase_length")]
    pub min_passphrase_length: usize,

    /// How many times the CLI re-prompts after a wrong passphrase.
    #[serde(default = "default_unlock_attempts")]
    pub unlock_attempts: u32,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            min_passphrase_length: default_min_passphrase_length(),
            unlock_attempts: default_unlock_attempts(),
        }
    }
}

fn default_min_passphrase_length() -> usize {
    8
}

fn default_unlock_attempts() -> u32 {
    3
}

/// Backup export/import configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BackupConfig {
    /// Directory where exported backup files are written by default.
    #[serde(default = "default_backup_directory")]
    pub directory: String,

    /// Categories included when no `--category` flag is given.
    #[serde(default = "default_categories")]
    pub default_categories: Vec<Category>,
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            directory: default_backup_directory(),
            default_categories: default_categories(),
        }
    }
}

fn default_backup_directory() -> String {
    dirs::data_dir()
        .map(|p| p.join("creatorvault").join("backups"))
        .unwrap_or_else(|| "backups".into())
        .display()
        .to_string()
}

fn default_categories() -> Vec<Category> {
    Category::all()
}
