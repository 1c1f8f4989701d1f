// SPDX-FileCopyrightText: 2026 CreatorVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborator traits the vault core is written against.
//!
//! Both traits use `#[async_trait]` so implementations can be held as
//! `Arc<dyn ...>` and injected at construction time.

pub mod bulk;
pub mod kv;

pub use bulk::BulkDataStore;
pub use kv::KeyValueStore;
