// SPDX-FileCopyrightText: 2026 CreatorVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as non-empty paths, known log levels, and duplicate-free category lists.

use std::collections::HashSet;

use crate::diagnostic::ConfigError;
use crate::model::CreatorVaultConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &CreatorVaultConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let level = config.app.log_level.trim().to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "app.log_level `{}` is not one of {}",
                config.app.log_level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if config.vault.min_passphrase_length < 1 {
        errors.push(ConfigError::Validation {
            message: "vault.min_passphrase_length must be at least 1".to_string(),
        });
    }

    if config.vault.unlock_attempts < 1 {
        errors.push(ConfigError::Validation {
            message: format!(
                "vault.unlock_attempts must be at least 1, got {}",
                config.vault.unlock_attempts
            ),
        });
    }

    if config.backup.directory.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "backup.directory must not be empty".to_string(),
        });
    }

    let mut seen = HashSet::new();
    for category in &config.backup.default_categories {
        if !seen.insert(category) {
            errors.push(ConfigError::Validation {
                message: format!("duplicate category `{category}` in backup.default_categories"),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use creatorvault_core::Category;

    use super::*;

    #[test]
    fn default_config_validates() {
        let config = CreatorVaultConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn empty_database_path_fails_validation() {
        let mut config = CreatorVaultConfig::default();
        config.storage.database_path = "".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("database_path"))));
    }

    #[test]
    fn zero_unlock_attempts_fails_validation() {
        let mut config = CreatorVaultConfig::default();
        config.vault.unlock_attempts = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("unlock_attempts"))));
    }

    #[test]
    fn unknown_log_level_fails_validation() {
        let mut config = CreatorVaultConfig::default();
        config.app.log_level = "verbose".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn duplicate_default_categories_fail_validation() {
        let mut config = CreatorVaultConfig::default();
        config.backup.default_categories = vec![Category::Settings, Category::Settings];
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(
            |e| matches!(e, ConfigError::Validation { message } if message.contains("duplicate category"))
        ));
    }

    #[test]
    fn all_errors_are_collected() {
        let mut config = CreatorVaultConfig::default();
        config.storage.database_path = " ".to_string();
        config.backup.directory = String::new();
        config.vault.min_passphrase_length = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn categories_deserialize_from_toml() {
        let toml_str = r#"
[backup]
default_categories = ["profiles", "settings"]
"#;
        let config: CreatorVaultConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(
            config.backup.default_categories,
            vec![Category::Profiles, Category::Settings]
        );
    }

    #[test]
    fn unknown_category_is_rejected() {
        let toml_str = r#"
[backup]
default_categories = ["thumbnails"]
"#;
        assert!(toml::from_str::<CreatorVaultConfig>(toml_str).is_err());
    }
}
