// SPDX-FileCopyrightText: 2026 CreatorVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end vault flows over SQLite storage.

use creatorvault_core::{Category, KeyValueStore, VaultError};
use creatorvault_test_utils::{TestHarness, secret};
use creatorvault_vault::{BackupFile, VaultState};
use serde_json::{Value, json};

async fn seeded(password: &str) -> TestHarness {
    let harness = TestHarness::builder()
        .with_vault(password)
        .build()
        .await
        .unwrap();
    harness
        .seed(Category::Profiles, vec![json!({"id": "1", "name": "Main channel"})])
        .await
        .unwrap();
    harness
        .seed(Category::Settings, vec![json!({"theme": "dark"})])
        .await
        .unwrap();
    harness
        .seed(Category::Ideas, vec![json!("unboxing"), json!("review")])
        .await
        .unwrap();
    harness
}

#[tokio::test]
async fn setup_save_and_load_round_trip() {
    let mut harness = TestHarness::builder().build().await.unwrap();
    harness.setup("Secret123!").await.unwrap();

    let key = harness.key().unwrap();
    harness
        .state_store
        .save("profiles", &json!([{"id": "1"}]), key)
        .await
        .unwrap();
    let loaded: Option<Value> = harness.state_store.load("profiles", key).await.unwrap();
    assert_eq!(loaded, Some(json!([{"id": "1"}])));
}

#[tokio::test]
async fn state_survives_reload_and_unlock() {
    let mut harness = TestHarness::builder()
        .with_vault("Secret123!")
        .build()
        .await
        .unwrap();
    let key = harness.key().unwrap();
    harness
        .state_store
        .save("settings", &json!({"autosave": true}), key)
        .await
        .unwrap();

    harness.reload().await.unwrap();
    assert_eq!(harness.manager.state(), VaultState::Locked);

    harness.unlock("Secret123!").await.unwrap();
    let loaded: Option<Value> = harness
        .state_store
        .load("settings", harness.key().unwrap())
        .await
        .unwrap();
    assert_eq!(loaded, Some(json!({"autosave": true})));
}

#[tokio::test]
async fn wrong_password_then_correct_password() {
    let mut harness = TestHarness::builder()
        .with_vault("Secret123!")
        .build()
        .await
        .unwrap();
    harness.reload().await.unwrap();

    let err = harness.unlock("wrong").await.unwrap_err();
    assert!(matches!(err, VaultError::InvalidPassword));
    assert_eq!(harness.manager.state(), VaultState::Locked);

    harness.unlock("Secret123!").await.unwrap();
    assert_eq!(harness.manager.state(), VaultState::Unlocked);
}

#[tokio::test]
async fn legacy_plain_string_loads_as_none() {
    let harness = TestHarness::builder()
        .with_vault("Secret123!")
        .build()
        .await
        .unwrap();
    harness.kv.set("x", "hello").await.unwrap();

    let loaded: Option<Value> = harness
        .state_store
        .load("x", harness.key().unwrap())
        .await
        .unwrap();
    assert!(loaded.is_none());
}

#[tokio::test]
async fn has_vault_before_setup_after_setup_after_reset() {
    let mut harness = TestHarness::builder().build().await.unwrap();
    assert!(!harness.manager.has_vault().await.unwrap());
    harness.setup("Secret123!").await.unwrap();
    assert!(harness.manager.has_vault().await.unwrap());
    harness.manager.reset_vault().await.unwrap();
    assert!(!harness.manager.has_vault().await.unwrap());
}

#[tokio::test]
async fn export_reset_setup_restore_identity() {
    let mut harness = seeded("Secret123!").await;
    let before = harness.bulk_snapshot().await.unwrap();

    let file = harness
        .exchange
        .export(&harness.manager, &Category::all(), harness.key().unwrap())
        .await
        .unwrap();
    let json = file.to_json_pretty().unwrap();

    harness.manager.reset_vault().await.unwrap();
    for category in Category::all() {
        harness.seed(category, Vec::new()).await.unwrap();
    }
    harness.setup("Brand-new pass").await.unwrap();

    let file = BackupFile::from_json(&json).unwrap();
    let report = harness
        .exchange
        .restore(
            &mut harness.manager,
            &file,
            harness.session_key.as_ref(),
            Some(&secret("Secret123!")),
            &Category::all(),
        )
        .await
        .unwrap();
    assert!(report.requires_unlock);
    assert!(report.missing.is_empty());
    assert_eq!(report.restored.len(), Category::all().len());
    assert_eq!(harness.bulk_snapshot().await.unwrap(), before);

    // The device now answers to the backup's password.
    harness.reload().await.unwrap();
    assert!(matches!(
        harness.unlock("Brand-new pass").await,
        Err(VaultError::InvalidPassword)
    ));
    harness.unlock("Secret123!").await.unwrap();
}

#[tokio::test]
async fn cross_device_restore_requires_backup_password() {
    let exporter = seeded("password-A").await;
    let file = exporter
        .exchange
        .export(&exporter.manager, &Category::all(), exporter.key().unwrap())
        .await
        .unwrap();

    let mut importer = TestHarness::builder()
        .with_vault("password-B")
        .build()
        .await
        .unwrap();
    importer
        .seed(Category::Settings, vec![json!({"theme": "light"})])
        .await
        .unwrap();
    let untouched = importer.bulk_snapshot().await.unwrap();
    let params_before = importer.manager.lock_parameters().await.unwrap();

    let err = importer
        .exchange
        .restore(
            &mut importer.manager,
            &file,
            importer.session_key.as_ref(),
            None,
            &Category::all(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, VaultError::PasswordMismatch));
    assert_eq!(importer.bulk_snapshot().await.unwrap(), untouched);
    assert_eq!(importer.manager.lock_parameters().await.unwrap(), params_before);

    importer
        .exchange
        .restore(
            &mut importer.manager,
            &file,
            importer.session_key.as_ref(),
            Some(&secret("password-A")),
            &Category::all(),
        )
        .await
        .unwrap();
    assert_eq!(
        importer.bulk_snapshot().await.unwrap(),
        exporter.bulk_snapshot().await.unwrap()
    );
    assert_eq!(
        importer.manager.lock_parameters().await.unwrap(),
        Some(file.security.clone())
    );
}

#[tokio::test]
async fn cross_password_restore_keeps_device_state_readable() {
    let exporter = seeded("password-A").await;
    let file = exporter
        .exchange
        .export(&exporter.manager, &Category::all(), exporter.key().unwrap())
        .await
        .unwrap();

    let mut device = TestHarness::builder()
        .with_vault("password-B")
        .build()
        .await
        .unwrap();
    device
        .state_store
        .save("settings", &json!({"autosave": false}), device.key().unwrap())
        .await
        .unwrap();

    let report = device
        .exchange
        .restore(
            &mut device.manager,
            &file,
            device.session_key.as_ref(),
            Some(&secret("password-A")),
            &Category::all(),
        )
        .await
        .unwrap();
    assert_eq!(report.state_reencrypted, 1);

    device.reload().await.unwrap();
    device.unlock("password-A").await.unwrap();
    let loaded: Option<Value> = device
        .state_store
        .load("settings", device.key().unwrap())
        .await
        .unwrap();
    assert_eq!(loaded, Some(json!({"autosave": false})));

    let new_key = device
        .manager
        .change_password(device.session_key.as_ref().unwrap(), &secret("password-C"))
        .await
        .unwrap();
    let loaded: Option<Value> = device.state_store.load("settings", &new_key).await.unwrap();
    assert_eq!(loaded, Some(json!({"autosave": false})));
}

#[tokio::test]
async fn partial_restore_leaves_other_categories_unchanged() {
    let mut harness = seeded("Secret123!").await;
    let file = harness
        .exchange
        .export(&harness.manager, &Category::all(), harness.key().unwrap())
        .await
        .unwrap();

    harness
        .seed(Category::Settings, vec![json!({"theme": "light"})])
        .await
        .unwrap();
    harness
        .seed(Category::Profiles, vec![json!({"id": "2"})])
        .await
        .unwrap();
    let mut expected = harness.bulk_snapshot().await.unwrap();
    expected.insert(Category::Settings, vec![json!({"theme": "dark"})]);

    harness
        .exchange
        .restore(
            &mut harness.manager,
            &file,
            harness.session_key.as_ref(),
            None,
            &[Category::Settings],
        )
        .await
        .unwrap();
    assert_eq!(harness.bulk_snapshot().await.unwrap(), expected);
}

#[tokio::test]
async fn backup_keeps_export_time_lock_parameters_after_password_change() {
    let mut harness = seeded("Secret123!").await;
    let file = harness
        .exchange
        .export(&harness.manager, &Category::all(), harness.key().unwrap())
        .await
        .unwrap();
    let exported_security = file.security.clone();

    let new_key = harness
        .manager
        .change_password(harness.session_key.as_ref().unwrap(), &secret("Changed-pass"))
        .await
        .unwrap();
    harness.session_key = Some(new_key);
    assert_ne!(
        harness.manager.lock_parameters().await.unwrap(),
        Some(exported_security.clone())
    );
    assert_eq!(file.security, exported_security);

    // The current key no longer opens the old backup; its own password does.
    let err = harness
        .exchange
        .restore(
            &mut harness.manager,
            &file,
            harness.session_key.as_ref(),
            None,
            &Category::all(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, VaultError::PasswordMismatch));

    harness
        .exchange
        .restore(
            &mut harness.manager,
            &file,
            harness.session_key.as_ref(),
            Some(&secret("Secret123!")),
            &Category::all(),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn password_change_keeps_saved_state_readable() {
    let mut harness = TestHarness::builder()
        .with_vault("Secret123!")
        .build()
        .await
        .unwrap();
    harness
        .state_store
        .save("preferences", &json!({"lang": "en"}), harness.key().unwrap())
        .await
        .unwrap();

    let new_key = harness
        .manager
        .change_password(harness.session_key.as_ref().unwrap(), &secret("Changed-pass"))
        .await
        .unwrap();
    harness.session_key = Some(new_key);

    harness.reload().await.unwrap();
    harness.unlock("Changed-pass").await.unwrap();
    let loaded: Option<Value> = harness
        .state_store
        .load("preferences", harness.key().unwrap())
        .await
        .unwrap();
    assert_eq!(loaded, Some(json!({"lang": "en"})));
}

#[tokio::test]
async fn failing_sink_surfaces_storage_error() {
    let mut harness = TestHarness::builder()
        .with_memory_storage()
        .with_vault("Secret123!")
        .build()
        .await
        .unwrap();
    harness
        .seed(Category::History, vec![json!({"at": 1})])
        .await
        .unwrap();
    let file = harness
        .exchange
        .export(&harness.manager, &[Category::History], harness.key().unwrap())
        .await
        .unwrap();

    let memory_bulk = harness.memory_bulk.clone().unwrap();
    memory_bulk.fail_writes_for(Category::History);
    let err = harness
        .exchange
        .restore(
            &mut harness.manager,
            &file,
            harness.session_key.as_ref(),
            None,
            &[Category::History],
        )
        .await
        .unwrap_err();
    assert!(matches!(err, VaultError::Storage { .. }));
    assert_eq!(harness.manager.state(), VaultState::Unlocked);
}
