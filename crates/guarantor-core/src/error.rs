// SPDX-FileCopyrightText: 2026 Guarantor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Guarantor escrow bot.

use strum::{Display, EnumString};
use thiserror::Error;

use crate::types::DealStatus;

/// User input fields validated by the conversation controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum InputField {
    Wallet,
    Card,
    Amount,
    Offer,
    DealCount,
}

/// The primary error type used across the store, engine, and channel layers.
#[derive(Debug, Error)]
pub enum GuarantorError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors. The triggering request fails; the process keeps running.
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Notification channel errors (connection failure, rejected delivery).
    #[error("channel error: {message}")]
    Channel {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// No deal exists under the normalized id.
    #[error("deal #{deal_id} not found")]
    NotFound { deal_id: String },

    /// The deal exists but is no longer open.
    #[error("deal #{deal_id} is {status}, not open")]
    NotOpen { deal_id: String, status: DealStatus },

    /// A seller tried to claim their own deal.
    #[error("deal #{deal_id} cannot be claimed by its seller")]
    SelfTrade { deal_id: String },

    /// Another buyer is already attached to the deal.
    #[error("deal #{deal_id} is already claimed by another buyer")]
    AlreadyClaimed { deal_id: String },

    /// The caller is not the participant allowed to perform the operation.
    #[error("not permitted on deal #{deal_id}: {reason}")]
    Forbidden { deal_id: String, reason: String },

    /// Step-local input was rejected; the conversation re-prompts.
    #[error("invalid {field}: {message}")]
    Validation { field: InputField, message: String },

    /// Deal creation requires a wallet or a card on file.
    #[error("no payment method on file")]
    NoPaymentMethod,

    /// Users may not overwrite their own successful-deal counter.
    #[error("successful-deal count override is disabled")]
    CountOverrideDisabled,

    /// The requested action is not valid from the current conversation step.
    #[error("cannot {action} while {state}")]
    InvalidTransition { state: String, action: String },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl GuarantorError {
    /// Shorthand for a [`GuarantorError::Validation`] error.
    pub fn validation(field: InputField, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    /// Wraps any error as a storage fault.
    pub fn storage<E>(source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Storage {
            source: Box::new(source),
        }
    }

    /// Returns true for errors the user can recover from by retrying or
    /// navigating back to the menu. Storage, channel, config, and internal
    /// faults are not recoverable from the conversation.
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            Self::Storage { .. } | Self::Channel { .. } | Self::Config(_) | Self::Internal(_)
        )
    }
}
