// SPDX-FileCopyrightText: 2026 Guarantor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.

use crate::diagnostic::ConfigError;
use crate::model::GuarantorConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every failure instead of stopping at the first one.
pub fn validate_config(config: &GuarantorConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    let level = config.bot.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "bot.log_level `{}` is not one of {}",
                config.bot.log_level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if let Some(username) = &config.telegram.bot_username {
        if !is_valid_username(username) {
            errors.push(ConfigError::Validation {
                message: format!(
                    "telegram.bot_username `{username}` must be 5-32 letters, digits or underscores, without `@`"
                ),
            });
        }
    }

    for (key, value) in [
        ("deals.escrow_wallet", &config.deals.escrow_wallet),
        ("deals.stars_recipient", &config.deals.stars_recipient),
    ] {
        if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
            errors.push(ConfigError::Validation {
                message: format!("{key} must not be empty when set"),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn is_valid_username(name: &str) -> bool {
    (5..=32).contains(&name.len())
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has_message(errors: &[ConfigError], needle: &str) -> bool {
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains(needle)))
    }

    #[test]
    fn default_config_validates() {
        assert!(validate_config(&GuarantorConfig::default()).is_ok());
    }

    #[test]
    fn empty_database_path_fails_validation() {
        let mut config = GuarantorConfig::default();
        config.storage.database_path = "  ".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "database_path"));
    }

    #[test]
    fn unknown_log_level_fails_validation() {
        let mut config = GuarantorConfig::default();
        config.bot.log_level = "verbose".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "bot.log_level"));
    }

    #[test]
    fn log_level_is_case_insensitive() {
        let mut config = GuarantorConfig::default();
        config.bot.log_level = "DEBUG".to_string();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn username_with_at_sign_fails_validation() {
        let mut config = GuarantorConfig::default();
        config.telegram.bot_username = Some("@guarantor_bot".to_string());
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "bot_username"));
    }

    #[test]
    fn all_errors_are_collected() {
        let mut config = GuarantorConfig::default();
        config.storage.database_path = String::new();
        config.bot.log_level = "loud".to_string();
        config.deals.escrow_wallet = Some(String::new());
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }
}
