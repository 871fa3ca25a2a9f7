// SPDX-FileCopyrightText: 2026 Guarantor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Step-local input validation for the conversation.

use std::sync::LazyLock;

use guarantor_core::{GuarantorError, InputField};
use regex::Regex;

static WALLET_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{48,64}$").expect("wallet pattern is valid"));

/// Marker every offer description must contain.
pub const OFFER_LINK_MARKER: &str = "t.me/nft/";

/// Accepts a TON wallet address. Returns the trimmed address.
pub fn wallet(input: &str) -> Result<String, GuarantorError> {
    let trimmed = input.trim();
    if WALLET_PATTERN.is_match(trimmed) {
        Ok(trimmed.to_string())
    } else {
        Err(GuarantorError::validation(
            InputField::Wallet,
            "expected 48-64 letters, digits, `_` or `-`",
        ))
    }
}

/// Accepts a card number written with optional spaces or hyphens.
/// Returns the bare digits.
pub fn card(input: &str) -> Result<String, GuarantorError> {
    let digits: String = input
        .chars()
        .filter(|c| !matches!(c, ' ' | '-'))
        .collect();
    let well_formed =
        (12..=19).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit());
    if well_formed {
        Ok(digits)
    } else {
        Err(GuarantorError::validation(
            InputField::Card,
            "expected 12-19 digits",
        ))
    }
}

/// Accepts an offer description that links to a collectible item.
pub fn offer(input: &str) -> Result<String, GuarantorError> {
    let trimmed = input.trim();
    if trimmed.contains(OFFER_LINK_MARKER) {
        Ok(trimmed.to_string())
    } else {
        Err(GuarantorError::validation(
            InputField::Offer,
            format!("description must contain a `{OFFER_LINK_MARKER}` link"),
        ))
    }
}
