// SPDX-FileCopyrightText: 2026 CreatorVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bulk-data source/sink for per-category record sets.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::VaultError;
use crate::types::{Category, HealthStatus};

/// Record storage addressed by [`Category`].
///
/// Backup export reads whole categories and restore replaces them. The
/// store never interprets record contents.
#[async_trait]
pub trait BulkDataStore: Send + Sync + 'static {
    /// Human-readable backend name for status output.
    fn name(&self) -> &str;

    /// Return every record in `category`, in insertion order.
    async fn get_all(&self, category: Category) -> Result<Vec<Value>, VaultError>;

    /// Replace the contents of `category` with `records`.
    ///
    /// Implementations must be all-or-nothing for the category: on error the
    /// previous records remain.
    async fn replace_all(&self, category: Category, records: Vec<Value>) -> Result<(), VaultError>;

    /// Performs a health check and returns the backend's current status.
    async fn health_check(&self) -> Result<HealthStatus, VaultError>;
}
