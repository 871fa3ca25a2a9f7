// SPDX-FileCopyrightText: 2026 Guarantor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Guarantor bot.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Guarantor configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GuarantorConfig {
    /// Bot identity and logging.
    #[serde(default)]
    pub bot: BotConfig,

    /// Telegram bot integration settings.
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Deal lifecycle policy and payment destinations.
    #[serde(default)]
    pub deals: DealsConfig,
}

/// Bot identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BotConfig {
    /// Display name used in logs.
    #[serde(default = "default_bot_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: default_bot_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_bot_name() -> String {
    "guarantor".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Telegram bot integration configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TelegramConfig {
    /// Telegram Bot API token. `None` disables Telegram integration.
    #[serde(default)]
    pub bot_token: Option<String>,

    /// Public bot username, without the `@`. Used to build deal deep links.
    #[serde(default)]
    pub bot_username: Option<String>,
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode.
    #[serde(default = "default_true")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: true,
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("guarantor").join("guarantor.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("guarantor.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_true() -> bool {
    true
}

/// Deal lifecycle policy.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DealsConfig {
    /// Keep cancelled deals as rows with status `cancelled` instead of deleting them.
    #[serde(default = "default_true")]
    pub preserve_cancelled: bool,

    /// Allow users to overwrite their own successful-deal counter.
    #[serde(default)]
    pub allow_count_override: bool,

    /// Escrow address wallet-rail buyers pay into.
    #[serde(default)]
    pub escrow_wallet: Option<String>,

    /// Account stars-rail buyers transfer stars to.
    #[serde(default)]
    pub stars_recipient: Option<String>,

    /// Contact shown in the welcome message.
    #[serde(default)]
    pub support_contact: Option<String>,
}

impl Default for DealsConfig {
    fn default() -> Self {
        Self {
            preserve_cancelled: true,
            allow_count_override: false,
            escrow_wallet: None,
            stars_recipient: None,
            support_contact: None,
        }
    }
}
