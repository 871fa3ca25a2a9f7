// SPDX-FileCopyrightText: 2026 Guarantor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Guarantor escrow bot.
//!
//! This crate provides the domain types, error taxonomy, and the trait seams
//! (store, session store, channel, notification gateway) that the deal engine
//! is written against. Storage and channel crates implement traits defined here.

pub mod conversation;
pub mod error;
pub mod event;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use conversation::{Conversation, DealDraft};
pub use error::{GuarantorError, InputField};
pub use event::{Action, Delivery, InboundEvent, Notice, Rejection, UsageHint};
pub use types::{
    AdapterType, Amount, Deal, DealId, DealPatch, DealStatus, DealTransition, HealthStatus,
    Language, NewDeal, PaymentRail, TransitionOutcome, User, UserId, UserPatch,
};

pub use traits::{
    ChannelAdapter, DealStore, NotificationGateway, PluginAdapter, SessionStore, StorageAdapter,
};
