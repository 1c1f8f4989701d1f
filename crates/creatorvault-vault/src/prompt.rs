// SPDX-FileCopyrightText: 2026 CreatorVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Passphrase acquisition via TTY prompt or `CREATORVAULT_PASSPHRASE`.

use std::io::IsTerminal;

use creatorvault_core::VaultError;
use secrecy::{ExposeSecret, SecretString};

/// The environment variable name for providing the vault passphrase.
pub const PASSPHRASE_ENV_VAR: &str = "CREATORVAULT_PASSPHRASE";

/// Environment variable for the replacement passphrase during a password change.
pub const NEW_PASSPHRASE_ENV_VAR: &str = "CREATORVAULT_NEW_PASSPHRASE";

/// Environment variable for the password a backup was created with.
pub const BACKUP_PASSPHRASE_ENV_VAR: &str = "CREATORVAULT_BACKUP_PASSPHRASE";

fn from_env(var: &str) -> Option<SecretString> {
    match std::env::var(var) {
        Ok(value) if !value.is_empty() => Some(SecretString::from(value)),
        _ => None,
    }
}

fn read_tty(label: &str) -> Result<SecretString, VaultError> {
    eprint!("{label}: ");
    let passphrase = rpassword::read_password()
        .map_err(|e| VaultError::PassphraseUnavailable(format!("failed to read passphrase: {e}")))?;
    if passphrase.is_empty() {
        return Err(VaultError::PassphraseUnavailable(
            "empty passphrase not allowed".to_string(),
        ));
    }
    Ok(SecretString::from(passphrase))
}

fn unavailable(var: &str) -> VaultError {
    VaultError::PassphraseUnavailable(format!(
        "no passphrase provided; set {var} or run interactively"
    ))
}

/// Reject passphrases shorter than `min_length` characters.
pub fn check_passphrase_policy(
    passphrase: &SecretString,
    min_length: usize,
) -> Result<(), VaultError> {
    if passphrase.expose_secret().chars().count() < min_length {
        return Err(VaultError::WeakPassphrase { min_length });
    }
    Ok(())
}

/// Get the vault passphrase.
///
/// Priority:
/// 1. `CREATORVAULT_PASSPHRASE` environment variable (headless use)
/// 2. Interactive TTY prompt via `rpassword`
pub fn get_passphrase() -> Result<SecretString, VaultError> {
    if let Some(passphrase) = from_env(PASSPHRASE_ENV_VAR) {
        return Ok(passphrase);
    }
    if std::io::stdin().is_terminal() {
        return read_tty("Vault passphrase");
    }
    Err(unavailable(PASSPHRASE_ENV_VAR))
}

fn new_passphrase_from(var: &str, min_length: usize) -> Result<SecretString, VaultError> {
    let passphrase = if let Some(passphrase) = from_env(var) {
        passphrase
    } else if std::io::stdin().is_terminal() {
        let first = read_tty("New vault passphrase")?;
        let second = read_tty("Confirm vault passphrase")?;
        if first.expose_secret() != second.expose_secret() {
            return Err(VaultError::PassphraseUnavailable(
                "passphrases do not match".to_string(),
            ));
        }
        first
    } else {
        return Err(unavailable(var));
    };
    check_passphrase_policy(&passphrase, min_length)?;
    Ok(passphrase)
}

/// Get the passphrase for a new vault.
///
/// The TTY path asks twice and requires both entries to match. The
/// environment variable is taken as-is. Either way the result must satisfy
/// [`check_passphrase_policy`].
pub fn get_new_passphrase(min_length: usize) -> Result<SecretString, VaultError> {
    new_passphrase_from(PASSPHRASE_ENV_VAR, min_length)
}

/// Get the replacement passphrase for a password change, from
/// `CREATORVAULT_NEW_PASSPHRASE` or the TTY.
pub fn get_replacement_passphrase(min_length: usize) -> Result<SecretString, VaultError> {
    new_passphrase_from(NEW_PASSPHRASE_ENV_VAR, min_length)
}

/// Whether the current passphrase comes from the environment, in which case
/// re-prompting after a failure cannot help.
pub fn passphrase_from_env() -> bool {
    from_env(PASSPHRASE_ENV_VAR).is_some()
}

/// Get the password a backup file was created with.
pub fn get_backup_passphrase() -> Result<SecretString, VaultError> {
    if let Some(passphrase) = from_env(BACKUP_PASSPHRASE_ENV_VAR) {
        return Ok(passphrase);
    }
    if std::io::stdin().is_terminal() {
        return read_tty("Backup passphrase");
    }
    Err(unavailable(BACKUP_PASSPHRASE_ENV_VAR))
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    #[test]
    #[serial]
    fn get_passphrase_from_env_var() {
        // SAFETY: test-only env mutation, serialized with #[serial].
        unsafe { std::env::set_var(PASSPHRASE_ENV_VAR, "test-passphrase") };
        let result = get_passphrase();
        unsafe { std::env::remove_var(PASSPHRASE_ENV_VAR) };

        assert_eq!(result.unwrap().expose_secret(), "test-passphrase");
    }

    #[test]
    #[serial]
    fn new_passphrase_from_env_is_policy_checked() {
        unsafe { std::env::set_var(PASSPHRASE_ENV_VAR, "short") };
        let weak = get_new_passphrase(8);
        let ok = get_new_passphrase(5);
        unsafe { std::env::remove_var(PASSPHRASE_ENV_VAR) };

        assert!(matches!(weak, Err(VaultError::WeakPassphrase { min_length: 8 })));
        assert!(ok.is_ok());
    }

    #[test]
    #[serial]
    fn empty_env_var_is_ignored() {
        unsafe { std::env::set_var(PASSPHRASE_ENV_VAR, "") };
        let result = from_env(PASSPHRASE_ENV_VAR);
        unsafe { std::env::remove_var(PASSPHRASE_ENV_VAR) };

        assert!(result.is_none());
    }

    #[test]
    #[serial]
    fn backup_passphrase_uses_its_own_variable() {
        unsafe {
            std::env::set_var(PASSPHRASE_ENV_VAR, "vault");
            std::env::set_var(BACKUP_PASSPHRASE_ENV_VAR, "backup");
        }
        let result = get_backup_passphrase();
        unsafe {
            std::env::remove_var(PASSPHRASE_ENV_VAR);
            std::env::remove_var(BACKUP_PASSPHRASE_ENV_VAR);
        }

        assert_eq!(result.unwrap().expose_secret(), "backup");
    }

    #[test]
    #[serial]
    fn replacement_passphrase_reads_its_own_variable() {
        unsafe {
            std::env::set_var(PASSPHRASE_ENV_VAR, "current-passphrase");
            std::env::set_var(NEW_PASSPHRASE_ENV_VAR, "replacement-passphrase");
        }
        let result = get_replacement_passphrase(8);
        unsafe {
            std::env::remove_var(PASSPHRASE_ENV_VAR);
            std::env::remove_var(NEW_PASSPHRASE_ENV_VAR);
        }

        assert_eq!(result.unwrap().expose_secret(), "replacement-passphrase");
    }

    #[test]
    fn policy_counts_characters_not_bytes() {
        let passphrase = SecretString::from("ééééé".to_string());
        assert!(check_passphrase_policy(&passphrase, 5).is_ok());
        assert!(check_passphrase_policy(&passphrase, 6).is_err());
    }
}
