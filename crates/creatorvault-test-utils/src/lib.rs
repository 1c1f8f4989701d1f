// SPDX-FileCopyrightText: 2026 CreatorVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for CreatorVault integration tests.
//!
//! [`TestHarness`] assembles temp storage, a vault manager with a fast key
//! derivation, the encrypted state store and the backup exchange, so tests
//! can drive whole user flows without touching real data directories.

pub mod harness;

pub use harness::{TestHarness, TestHarnessBuilder, secret};
