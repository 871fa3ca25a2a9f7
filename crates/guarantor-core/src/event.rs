// SPDX-FileCopyrightText: 2026 Guarantor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inbound events and outbound notices exchanged with channel adapters.
//!
//! Channel adapters translate platform updates into [`InboundEvent`]s and
//! render [`Notice`]s back into platform messages. Neither side knows how the
//! other formats text.

use crate::error::InputField;
use crate::types::{Amount, Deal, DealId, Language, PaymentRail, UserId};

/// A user action received from a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    pub user: UserId,
    /// Public handle of the sender, if the platform exposes one.
    pub display_name: Option<String>,
    pub action: Action,
}

impl InboundEvent {
    pub fn new(user: UserId, display_name: Option<String>, action: Action) -> Self {
        Self {
            user,
            display_name,
            action,
        }
    }

    /// Handle used in notices and as the denormalized seller name.
    pub fn display_name_or_unknown(&self) -> String {
        self.display_name
            .clone()
            .unwrap_or_else(|| "unknown".to_string())
    }
}

/// Commands that were recognized but carried malformed arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageHint {
    Buy,
    Confirm,
    Cancel,
    SetDeals,
}

/// Everything a user can ask the bot to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// `/start`, optionally with a deep-link payload.
    Start { payload: Option<String> },
    /// Back to the main menu from any step.
    Menu,
    /// Open the payment-method submenu.
    ManageWallets,
    AddWallet,
    AddCard,
    CreateDeal,
    ChooseRail(PaymentRail),
    /// Free text, interpreted by the current conversation step.
    Text(String),
    Claim(String),
    ConfirmPayment(String),
    /// Ask for confirmation before cancelling.
    RequestCancel(String),
    Cancel(String),
    /// Buyer walks away from a deal without touching it.
    LeaveDeal(String),
    /// Request the stars payment instructions for a claimed deal.
    PayStars(String),
    /// A completed platform payment carrying the invoice payload.
    PaymentReceived { payload: String },
    SetDealCount(i64),
    /// `None` opens the language picker.
    ChangeLanguage(Option<Language>),
    Usage(UsageHint),
}

/// Reasons an action was refused, shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    NotFound { deal_id: String },
    NotOpen { deal_id: String },
    SelfTrade,
    AlreadyClaimed,
    Forbidden { deal_id: String },
    InvalidInput(InputField),
    NoPaymentMethod,
    InvalidStep,
    CountOverrideDisabled,
}

/// A typed outbound message. Rendering is up to the channel adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Welcome,
    ManageWallets,
    PromptWallet { current: Option<String> },
    PromptCard { current: Option<String> },
    WalletSaved,
    CardSaved,
    ChoosePayMethod,
    PromptAmount { rail: PaymentRail },
    PromptOffer { rail: PaymentRail, amount: Amount },
    DealCreated { deal: Deal, link: String },
    ConfirmCancel { deal_id: DealId },
    DealCancelled { deal_id: DealId },
    /// Summary shown to the buyer after a successful claim.
    DealSummary {
        deal: Deal,
        seller_deals: i64,
        /// Where to send the payment: escrow wallet, stars recipient, or the
        /// seller's card. `None` when nothing is configured or on file.
        pay_to: Option<String>,
    },
    BuyerJoined { deal_id: DealId, buyer_name: String },
    /// Sent to the seller when the buyer confirms payment.
    PaymentConfirmed { deal: Deal, buyer_name: String },
    /// Sent to the buyer after the confirmation was accepted.
    PaymentAccepted,
    StarsPayment {
        deal: Deal,
        recipient: Option<String>,
    },
    /// Sent to the buyer after stepping away. The buyer slot stays taken.
    LeftDeal { deal_id: DealId },
    /// Sent to the seller when the attached buyer steps away from an open deal.
    BuyerLeft { deal_id: DealId, buyer_name: String },
    DealCountSet { count: i64 },
    ChooseLanguage,
    LanguageChanged { language: Language },
    Usage(UsageHint),
    Rejected(Rejection),
    /// A storage or internal fault; the user may retry.
    Failure,
}

/// A notice addressed to one user in that user's language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub user: UserId,
    pub language: Language,
    pub notice: Notice,
}
