// SPDX-FileCopyrightText: 2026 CreatorVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the [`KeyValueStore`] medium.

use async_trait::async_trait;
use creatorvault_core::{KeyValueStore, VaultError};
use rusqlite::params;
use tracing::debug;

use crate::database::{map_tr_err, Database};

/// Key-value medium stored in the `kv_entries` table.
#[derive(Clone)]
pub struct SqliteKeyValueStore {
    db: Database,
}

impl SqliteKeyValueStore {
    /// Create a store over an open database.
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl KeyValueStore for SqliteKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, VaultError> {
        let key = key.to_string();
        self.db
            .connection()
            .call(move |conn| -> Result<Option<String>, rusqlite::Error> {
                let result = conn.query_row(
                    "SELECT value FROM kv_entries WHERE key = ?1",
                    params![key],
                    |row| row.get(0),
                );
                match result {
                    Ok(value) => Ok(Some(value)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e),
                }
            })
            .await
            .map_err(map_tr_err)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), VaultError> {
        let entry = (key.to_string(), value.to_string());
        self.db
            .connection()
            .call(move |conn| -> Result<(), rusqlite::Error> {
                conn.execute(
                    "INSERT OR REPLACE INTO kv_entries (key, value) VALUES (?1, ?2)",
                    params![entry.0, entry.1],
                )?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        debug!(key = %key, "kv entry written");
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), VaultError> {
        let key_owned = key.to_string();
        self.db
            .connection()
            .call(move |conn| -> Result<(), rusqlite::Error> {
                conn.execute("DELETE FROM kv_entries WHERE key = ?1", params![key_owned])?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        debug!(key = %key, "kv entry removed");
        Ok(())
    }

    async fn clear(&self) -> Result<(), VaultError> {
        self.db
            .connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute("DELETE FROM kv_entries", [])?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }

    async fn keys(&self) -> Result<Vec<String>, VaultError> {
        self.db
            .connection()
            .call(|conn| -> Result<Vec<String>, rusqlite::Error> {
                let mut stmt = conn.prepare("SELECT key FROM kv_entries ORDER BY key")?;
                let rows = stmt.query_map([], |row| row.get(0))?;
                let mut keys = Vec::new();
                for row in rows {
                    keys.push(row?);
                }
                Ok(keys)
            })
            .await
            .map_err(map_tr_err)
    }

    async fn set_many(&self, entries: &[(String, String)]) -> Result<(), VaultError> {
        let entries = entries.to_vec();
        let count = entries.len();
        self.db
            .connection()
            .call(move |conn| -> Result<(), rusqlite::Error> {
                let tx = conn.transaction()?;
                for (key, value) in &entries {
                    tx.execute(
                        "INSERT OR REPLACE INTO kv_entries (key, value) VALUES (?1, ?2)",
                        params![key, value],
                    )?;
                }
                tx.commit()
            })
            .await
            .map_err(map_tr_err)?;
        debug!(count, "kv entries written atomically");
        Ok(())
    }

    async fn remove_many(&self, keys: &[String]) -> Result<(), VaultError> {
        let keys = keys.to_vec();
        self.db
            .connection()
            .call(move |conn| -> Result<(), rusqlite::Error> {
                let tx = conn.transaction()?;
                for key in &keys {
                    tx.execute("DELETE FROM kv_entries WHERE key = ?1", params![key])?;
                }
                tx.commit()
            })
            .await
            .map_err(map_tr_err)
    }
}
