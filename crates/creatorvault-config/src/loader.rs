// SPDX-FileCopyrightText: 2026 CreatorVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./creatorvault.toml` > `~/.config/creatorvault/creatorvault.toml`
//! > `/etc/creatorvault/creatorvault.toml` with environment variable overrides via the
//! `CREATORVAULT_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::CreatorVaultConfig;

/// Local config file name, also used under the XDG and system directories.
pub const CONFIG_FILE_NAME: &str = "creatorvault.toml";

/// System-wide config file path.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/creatorvault/creatorvault.toml";

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/creatorvault/creatorvault.toml` (system-wide)
/// 3. `~/.config/creatorvault/creatorvault.toml` (user XDG config)
/// 4. `./creatorvault.toml` (local directory)
/// 5. `CREATORVAULT_*` environment variables
pub fn load_config() -> Result<CreatorVaultConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env vars).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<CreatorVaultConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(CreatorVaultConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<CreatorVaultConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(CreatorVaultConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading (exposed for diagnostic use).
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(CreatorVaultConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(CONFIG_FILE_NAME))
        .merge(env_provider())
}

/// Path of the per-user config file, if a config directory exists.
pub fn user_config_path() -> Option<std::path::PathBuf> {
    dirs::config_dir().map(|d| d.join("creatorvault").join(CONFIG_FILE_NAME))
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because keys contain
/// underscores: `CREATORVAULT_STORAGE_DATABASE_PATH` must map to
/// `storage.database_path`, not `storage.database.path`.
fn env_provider() -> Env {
    Env::prefixed("CREATORVAULT_")
        .ignore(&["passphrase", "new_passphrase", "backup_passphrase"])
        .map(|key| {
            let mapped = key
                .as_str()
                .replacen("app_", "app.", 1)
                .replacen("storage_", "storage.", 1)
                .replacen("vault_", "vault.", 1)
                .replacen("backup_", "backup.", 1);
            mapped.into()
        })
}
