// SPDX-FileCopyrightText: 2026 Guarantor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-user conversation state.
//!
//! The conversation is an explicit tagged union: each step carries exactly
//! the partially collected deal fields it needs, so there is no string-keyed
//! scratch space to fall out of sync with the current step.

use std::fmt;

use crate::types::{Amount, NewDeal, PaymentRail, UserId};

/// Partially collected deal fields, accumulated across the creation steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DealDraft {
    pub rail: PaymentRail,
    pub amount: Amount,
}

impl DealDraft {
    pub fn new(rail: PaymentRail, amount: Amount) -> Self {
        Self { rail, amount }
    }

    /// Completes the draft with the seller's offer description.
    pub fn finish(self, seller_id: UserId, seller_name: String, offer: String) -> NewDeal {
        NewDeal {
            seller_id,
            seller_name,
            amount: self.amount,
            offer,
            rail: self.rail,
        }
    }
}

/// States of the per-user conversation FSM.
///
/// `Idle` is the initial state for every user and the target of every
/// "back to menu" and completion transition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Conversation {
    /// No input expected.
    #[default]
    Idle,
    /// Waiting for a TON wallet address.
    AwaitingWallet,
    /// Waiting for a card number.
    AwaitingCard,
    /// Waiting for the seller to pick a payment rail.
    AwaitingPayMethod,
    /// Waiting for the amount on the chosen rail.
    AwaitingAmount { rail: PaymentRail },
    /// Waiting for the offer description that completes the draft.
    AwaitingOffer(DealDraft),
}

impl Conversation {
    pub fn is_idle(&self) -> bool {
        matches!(self, Conversation::Idle)
    }
}

impl fmt::Display for Conversation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Conversation::Idle => write!(f, "idle"),
            Conversation::AwaitingWallet => write!(f, "awaiting-wallet"),
            Conversation::AwaitingCard => write!(f, "awaiting-card"),
            Conversation::AwaitingPayMethod => write!(f, "awaiting-pay-method"),
            Conversation::AwaitingAmount { rail } => write!(f, "awaiting-amount-{rail}"),
            Conversation::AwaitingOffer(_) => write!(f, "awaiting-offer-description"),
        }
    }
}
