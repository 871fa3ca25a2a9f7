// SPDX-FileCopyrightText: 2026 Guarantor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Guarantor configuration system.

use std::path::Path;

use guarantor_config::diagnostic::ConfigError;
use guarantor_config::{
    GuarantorConfig, effective_toml, load_and_validate_str, load_config_from_path,
    load_config_from_str,
};
use serial_test::serial;

#[test]
fn valid_toml_deserializes_into_config() {
    let toml = r#"
[bot]
name = "escrow"
log_level = "debug"

[telegram]
bot_token = "123:ABC"
bot_username = "escrow_test_bot"

[storage]
database_path = "/tmp/guarantor-test.db"
wal_mode = false

[deals]
preserve_cancelled = false
allow_count_override = true
escrow_wallet = "UQAbcdefghijklmnopqrstuvwxyz0123456789ABCDEFGHIJKL"
stars_recipient = "escrow_support"
support_contact = "@escrow_support"
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.bot.name, "escrow");
    assert_eq!(config.bot.log_level, "debug");
    assert_eq!(config.telegram.bot_token.as_deref(), Some("123:ABC"));
    assert_eq!(config.telegram.bot_username.as_deref(), Some("escrow_test_bot"));
    assert_eq!(config.storage.database_path, "/tmp/guarantor-test.db");
    assert!(!config.storage.wal_mode);
    assert!(!config.deals.preserve_cancelled);
    assert!(config.deals.allow_count_override);
    assert_eq!(config.deals.stars_recipient.as_deref(), Some("escrow_support"));
    assert_eq!(config.deals.support_contact.as_deref(), Some("@escrow_support"));
}

#[test]
fn empty_toml_uses_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");
    assert_eq!(config.bot.name, "guarantor");
    assert_eq!(config.bot.log_level, "info");
    assert!(config.telegram.bot_token.is_none());
    assert!(config.storage.database_path.ends_with("guarantor.db"));
    assert!(config.storage.wal_mode);
    assert!(config.deals.preserve_cancelled);
    assert!(!config.deals.allow_count_override);
    assert!(config.deals.escrow_wallet.is_none());
}

#[test]
fn unknown_top_level_section_is_rejected() {
    let toml = r#"
[logging]
level = "debug"
"#;
    let err = load_config_from_str(toml).expect_err("unknown section should be rejected");
    let err_str = err.to_string();
    assert!(
        err_str.contains("unknown field") || err_str.contains("logging"),
        "got: {err_str}"
    );
}

#[test]
fn unknown_key_produces_suggestion() {
    let toml = r#"
[deals]
preserve_canceled = false
"#;
    let errors = load_and_validate_str(toml).expect_err("should produce errors");
    let found = errors.iter().any(|e| {
        matches!(e, ConfigError::UnknownKey { key, suggestion, valid_keys, .. } if {
            key == "preserve_canceled"
                && suggestion.as_deref() == Some("preserve_cancelled")
                && valid_keys.contains("allow_count_override")
        })
    });
    assert!(found, "expected UnknownKey with suggestion, got: {errors:?}");
}

#[test]
fn invalid_type_is_reported() {
    let toml = r#"
[storage]
wal_mode = "sometimes"
"#;
    let errors = load_and_validate_str(toml).expect_err("should reject invalid type");
    assert!(
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::InvalidType { key, .. } if key.contains("wal_mode"))),
        "got: {errors:?}"
    );
}

#[test]
fn validation_runs_after_successful_load() {
    let toml = r#"
[bot]
log_level = "chatty"
"#;
    let errors = load_and_validate_str(toml).expect_err("bad log level should fail");
    assert!(errors.iter().any(
        |e| matches!(e, ConfigError::Validation { message } if message.contains("log_level"))
    ));
}

#[test]
fn unknown_key_renders_with_miette() {
    use miette::{Diagnostic, GraphicalReportHandler};

    let error = ConfigError::UnknownKey {
        key: "escrow_walet".to_string(),
        suggestion: Some("escrow_wallet".to_string()),
        valid_keys: "preserve_cancelled, escrow_wallet".to_string(),
        span: None,
        src: None,
    };
    assert!(error.code().is_some());
    let help = error.help().map(|h| h.to_string()).unwrap_or_default();
    assert!(help.contains("did you mean `escrow_wallet`"), "got: {help}");

    let mut buf = String::new();
    GraphicalReportHandler::new()
        .render_report(&mut buf, &error)
        .expect("should render");
    assert!(buf.contains("escrow_walet"));
}

#[test]
fn missing_file_is_skipped() {
    let config = load_config_from_path(Path::new("/nonexistent/guarantor.toml"))
        .expect("missing file should be skipped");
    assert_eq!(config.bot.name, "guarantor");
}

#[test]
#[serial]
fn env_vars_override_file_values() {
    // SAFETY: env mutation is serialized across tests by `#[serial]`.
    unsafe {
        std::env::set_var("GUARANTOR_TELEGRAM_BOT_TOKEN", "xyz-from-env");
        std::env::set_var("GUARANTOR_DEALS_ALLOW_COUNT_OVERRIDE", "true");
    }
    let result = load_config_from_path(Path::new("/nonexistent/guarantor.toml"));
    unsafe {
        std::env::remove_var("GUARANTOR_TELEGRAM_BOT_TOKEN");
        std::env::remove_var("GUARANTOR_DEALS_ALLOW_COUNT_OVERRIDE");
    }

    let config: GuarantorConfig = result.expect("env overrides should apply");
    assert_eq!(config.telegram.bot_token.as_deref(), Some("xyz-from-env"));
    assert!(config.deals.allow_count_override);
}

#[test]
#[serial]
fn env_var_for_unknown_key_is_rejected() {
    unsafe {
        std::env::set_var("GUARANTOR_DEALS_AUTO_COMPLETE", "true");
    }
    let result = load_config_from_path(Path::new("/nonexistent/guarantor.toml"));
    unsafe {
        std::env::remove_var("GUARANTOR_DEALS_AUTO_COMPLETE");
    }
    assert!(result.is_err());
}

#[test]
fn effective_toml_masks_token_and_round_trips() {
    let config = load_config_from_str(
        r#"
[telegram]
bot_token = "123456:secret"
bot_username = "escrow_bot"

[deals]
preserve_cancelled = false
"#,
    )
    .unwrap();
    let rendered = effective_toml(&config).unwrap();
    assert!(!rendered.contains("123456:secret"));
    assert!(rendered.contains("bot_username = \"escrow_bot\""));

    let reparsed = load_config_from_str(&rendered).unwrap();
    assert_eq!(reparsed.telegram.bot_token.as_deref(), Some("***"));
    assert!(!reparsed.deals.preserve_cancelled);
}
