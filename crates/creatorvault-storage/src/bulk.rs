// SPDX-FileCopyrightText: 2026 CreatorVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the [`BulkDataStore`] sink.

use async_trait::async_trait;
use creatorvault_core::{BulkDataStore, Category, HealthStatus, VaultError};
use rusqlite::params;
use serde_json::Value;
use tracing::debug;

use crate::database::{map_tr_err, Database};

/// Bulk record storage in the `bulk_records` table, one row per record.
#[derive(Clone)]
pub struct SqliteBulkStore {
    db: Database,
}

impl SqliteBulkStore {
    /// Create a store over an open database.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Number of records stored for `category`.
    pub async fn count(&self, category: Category) -> Result<usize, VaultError> {
        let name = category.as_str();
        self.db
            .connection()
            .call(move |conn| -> Result<i64, rusqlite::Error> {
                conn.query_row(
                    "SELECT COUNT(*) FROM bulk_records WHERE category = ?1",
                    params![name],
                    |row| row.get(0),
                )
            })
            .await
            .map_err(map_tr_err)
            .map(|n| n as usize)
    }
}

#[async_trait]
impl BulkDataStore for SqliteBulkStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn get_all(&self, category: Category) -> Result<Vec<Value>, VaultError> {
        let name = category.as_str();
        let bodies = self
            .db
            .connection()
            .call(move |conn| -> Result<Vec<String>, rusqlite::Error> {
                let mut stmt = conn.prepare(
                    "SELECT body FROM bulk_records WHERE category = ?1 ORDER BY position",
                )?;
                let rows = stmt.query_map(params![name], |row| row.get(0))?;
                let mut bodies = Vec::new();
                for row in rows {
                    bodies.push(row?);
                }
                Ok(bodies)
            })
            .await
            .map_err(map_tr_err)?;

        bodies
            .iter()
            .map(|body| serde_json::from_str(body).map_err(VaultError::storage))
            .collect()
    }

    async fn replace_all(&self, category: Category, records: Vec<Value>) -> Result<(), VaultError> {
        let name = category.as_str();
        let bodies = records
            .iter()
            .map(serde_json::to_string)
            .collect::<Result<Vec<_>, _>>()?;
        let count = bodies.len();

        self.db
            .connection()
            .call(move |conn| -> Result<(), rusqlite::Error> {
                let tx = conn.transaction()?;
                tx.execute("DELETE FROM bulk_records WHERE category = ?1", params![name])?;
                for (position, body) in bodies.iter().enumerate() {
                    tx.execute(
                        "INSERT INTO bulk_records (category, position, body) VALUES (?1, ?2, ?3)",
                        params![name, position as i64, body],
                    )?;
                }
                tx.commit()
            })
            .await
            .map_err(map_tr_err)?;

        debug!(category = %category, count, "category replaced");
        Ok(())
    }

    async fn health_check(&self) -> Result<HealthStatus, VaultError> {
        let result = self
            .db
            .connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await;
        Ok(match result {
            Ok(()) => HealthStatus::Healthy,
            Err(e) => HealthStatus::Unhealthy(e.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    async fn open_test_store() -> (SqliteBulkStore, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bulk.db");
        let db = Database::open(path.to_str().unwrap(), true).await.unwrap();
        (db.bulk_store(), dir)
    }

    #[tokio::test]
    async fn empty_category_returns_empty_vec() {
        let (store, _dir) = open_test_store().await;
        assert!(store.get_all(Category::Videos).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn replace_all_preserves_order() {
        let (store, _dir) = open_test_store().await;
        let records = vec![
            json!({"id": "b", "title": "Second upload"}),
            json!({"id": "a", "title": "First upload"}),
            json!({"id": "c", "views": 1200}),
        ];
        store
            .replace_all(Category::Videos, records.clone())
            .await
            .unwrap();

        assert_eq!(store.get_all(Category::Videos).await.unwrap(), records);
        assert_eq!(store.count(Category::Videos).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn replace_all_clears_previous_records() {
        let (store, _dir) = open_test_store().await;
        store
            .replace_all(Category::Ideas, vec![json!(1), json!(2), json!(3)])
            .await
            .unwrap();
        store
            .replace_all(Category::Ideas, vec![json!("only")])
            .await
            .unwrap();
        assert_eq!(
            store.get_all(Category::Ideas).await.unwrap(),
            vec![json!("only")]
        );
    }

    #[tokio::test]
    async fn categories_are_isolated() {
        let (store, _dir) = open_test_store().await;
        store
            .replace_all(Category::Profiles, vec![json!({"id": "1"})])
            .await
            .unwrap();
        store
            .replace_all(Category::Settings, vec![json!({"theme": "dark"})])
            .await
            .unwrap();
        store.replace_all(Category::Settings, vec![]).await.unwrap();

        assert_eq!(store.get_all(Category::Profiles).await.unwrap().len(), 1);
        assert!(store.get_all(Category::Settings).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn health_check_reports_healthy() {
        let (store, _dir) = open_test_store().await;
        assert_eq!(store.health_check().await.unwrap(), HealthStatus::Healthy);
        assert_eq!(store.name(), "sqlite");
    }
}
