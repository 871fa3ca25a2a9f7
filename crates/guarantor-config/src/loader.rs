// SPDX-FileCopyrightText: 2026 Guarantor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./guarantor.toml` > `~/.config/guarantor/guarantor.toml`
//! > `/etc/guarantor/guarantor.toml` with environment variable overrides via
//! the `GUARANTOR_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::GuarantorConfig;

pub(crate) const SYSTEM_CONFIG: &str = "/etc/guarantor/guarantor.toml";
pub(crate) const LOCAL_CONFIG: &str = "guarantor.toml";

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/guarantor/guarantor.toml` (system-wide)
/// 3. `~/.config/guarantor/guarantor.toml` (user XDG config)
/// 4. `./guarantor.toml` (local directory)
/// 5. `GUARANTOR_*` environment variables
pub fn load_config() -> Result<GuarantorConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<GuarantorConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(GuarantorConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<GuarantorConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(GuarantorConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the layered Figment before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(GuarantorConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG))
        .merge(Toml::file(user_config_path()))
        .merge(Toml::file(LOCAL_CONFIG))
        .merge(env_provider())
}

pub(crate) fn user_config_path() -> std::path::PathBuf {
    dirs::config_dir()
        .map(|d| d.join("guarantor").join(LOCAL_CONFIG))
        .unwrap_or_default()
}

/// Environment provider with explicit section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `GUARANTOR_TELEGRAM_BOT_TOKEN` must map to
/// `telegram.bot_token`, not `telegram.bot.token`.
fn env_provider() -> Env {
    Env::prefixed("GUARANTOR_").map(|key| env_key_to_path(key.as_str()).into())
}

/// Top-level sections. Matched against the start of the key only, so that
/// `telegram_bot_token` is not mistaken for the `bot` section.
const SECTIONS: [&str; 4] = ["bot", "telegram", "storage", "deals"];

/// Maps a prefix-stripped env key to a dotted config path.
///
/// figment hands the key over in its original case, so it is lowercased
/// here. `TELEGRAM_BOT_TOKEN` -> `telegram.bot_token`. Keys outside a known
/// section pass through and are rejected later by `deny_unknown_fields`.
pub(crate) fn env_key_to_path(key: &str) -> String {
    let key = key.to_ascii_lowercase();
    for section in SECTIONS {
        if let Some(rest) = key.strip_prefix(section).and_then(|r| r.strip_prefix('_')) {
            return format!("{section}.{rest}");
        }
    }
    key
}
