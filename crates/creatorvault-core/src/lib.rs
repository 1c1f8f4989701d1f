// SPDX-FileCopyrightText: 2026 CreatorVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for CreatorVault.
//!
//! This crate provides the error taxonomy, the state categories, and the two
//! collaborator traits (a key-value medium and a bulk-data store) that the
//! vault crate is written against. Storage backends implement the traits
//! defined here.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::VaultError;
pub use traits::{BulkDataStore, KeyValueStore};
pub use types::{Category, HealthStatus};
