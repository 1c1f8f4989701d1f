// SPDX-FileCopyrightText: 2026 CreatorVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the storage, vault, and CLI crates.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// A named bucket of persisted application state.
///
/// The vault treats every bucket as opaque JSON; only the names matter for
/// partial backup and restore.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Category {
    /// Channel profile records.
    Profiles,
    /// Global application settings.
    Settings,
    /// Cached third-party video entities.
    Videos,
    /// Generated content ideas.
    Ideas,
    /// Generation and activity history logs.
    History,
    /// Metadata and thumbnail templates.
    Templates,
    /// User preferences.
    Preferences,
}

impl Category {
    /// Every category in canonical order.
    pub fn all() -> Vec<Category> {
        Category::iter().collect()
    }

    /// The wire name used in backup payloads and storage rows.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Profiles => "profiles",
            Category::Settings => "settings",
            Category::Videos => "videos",
            Category::Ideas => "ideas",
            Category::History => "history",
            Category::Templates => "templates",
            Category::Preferences => "preferences",
        }
    }
}

/// Health status reported by storage backends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Backend is fully operational.
    Healthy,
    /// Backend is operational but experiencing issues.
    Degraded(String),
    /// Backend is not operational.
    Unhealthy(String),
}
