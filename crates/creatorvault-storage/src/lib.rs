// SPDX-FileCopyrightText: 2026 CreatorVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistence layer for CreatorVault.
//!
//! Provides WAL-mode SQLite storage with embedded migrations and a
//! single-writer concurrency model via `tokio-rusqlite`, implementing the
//! key-value medium and the bulk-data store from `creatorvault-core`. In-memory
//! variants of both are available for tests.

pub mod bulk;
pub mod database;
pub mod kv;
pub mod memory;
pub mod migrations;

pub use bulk::SqliteBulkStore;
pub use database::Database;
pub use kv::SqliteKeyValueStore;
pub use memory::{MemoryBulkStore, MemoryKeyValueStore};
