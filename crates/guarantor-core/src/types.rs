// SPDX-FileCopyrightText: 2026 Guarantor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared by the store, engine, and channel adapters.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use rand::distributions::Alphanumeric;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::{GuarantorError, InputField};

/// Length of a generated deal token.
pub const DEAL_ID_LEN: usize = 8;

/// Stable external identity of a user (the Telegram user id).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque deal token, e.g. `aB3dE9xZ`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DealId(String);

impl DealId {
    /// Generates a random 8-character alphanumeric token.
    ///
    /// Uniqueness is not checked against existing rows.
    pub fn generate() -> Self {
        let token: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(DEAL_ID_LEN)
            .map(char::from)
            .collect();
        Self(token)
    }

    /// Normalizes an externally supplied id: trims surrounding whitespace and
    /// strips a leading `#` marker. Case is preserved.
    pub fn normalize(raw: &str) -> Self {
        let trimmed = raw.trim();
        let stripped = trimmed.strip_prefix('#').unwrap_or(trimmed);
        Self(stripped.trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for DealId {
    /// Wraps an id that is already in canonical form (e.g. read from the store).
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for DealId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Payment channel of a deal.
///
/// The serialized form doubles as the deep-link rail prefix and the stored
/// column value.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum PaymentRail {
    /// TON wallet transfer.
    #[strum(serialize = "ton")]
    #[serde(rename = "ton")]
    Wallet,
    /// Telegram Stars (platform reward points). Always whole numbers.
    #[strum(serialize = "star")]
    #[serde(rename = "star")]
    Stars,
    /// Bank card transfer, denominated in RUB.
    #[strum(serialize = "card")]
    #[serde(rename = "card")]
    Card,
}

impl PaymentRail {
    /// Currency code shown next to amounts on this rail.
    pub fn currency(&self) -> &'static str {
        match self {
            PaymentRail::Wallet => "TON",
            PaymentRail::Stars => "STAR",
            PaymentRail::Card => "RUB",
        }
    }
}

/// Preferred interface language.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// Primary language.
    #[default]
    Ru,
    /// Secondary language.
    En,
}

impl Language {
    /// Parses a stored language code, falling back to the primary language
    /// for anything unrecognized.
    pub fn from_stored(code: Option<&str>) -> Self {
        code.and_then(|c| c.parse().ok()).unwrap_or_default()
    }
}

/// Lifecycle status of a deal. Transitions only leave `Open`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DealStatus {
    Open,
    Completed,
    Cancelled,
}

/// A positive deal amount. The unit is implied by the deal's rail.
///
/// Decimal precision is kept exactly as entered (`10.50` stays `10.50`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amount(Decimal);

impl Amount {
    /// Parses user input for the given rail.
    ///
    /// Wallet and card rails accept a positive decimal with either `,` or `.`
    /// as the separator. The stars rail accepts a positive integer only.
    pub fn parse(input: &str, rail: PaymentRail) -> Result<Self, GuarantorError> {
        let trimmed = input.trim();
        let value = match rail {
            PaymentRail::Stars => trimmed
                .parse::<i64>()
                .map(Decimal::from)
                .map_err(|_| GuarantorError::validation(InputField::Amount, "expected a whole number"))?,
            PaymentRail::Wallet | PaymentRail::Card => Decimal::from_str(&trimmed.replace(',', "."))
                .map_err(|_| GuarantorError::validation(InputField::Amount, "expected a decimal number"))?,
        };
        if value <= Decimal::ZERO {
            return Err(GuarantorError::validation(
                InputField::Amount,
                "amount must be positive",
            ));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Formats the amount for display on the given rail. Stars amounts are
    /// always shown as integers.
    pub fn display_for(&self, rail: PaymentRail) -> String {
        match rail {
            PaymentRail::Stars => self.0.trunc().to_string(),
            PaymentRail::Wallet | PaymentRail::Card => self.0.to_string(),
        }
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Self(value)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Amount {
    type Err = rust_decimal::Error;

    /// Parses the stored representation without rail-specific validation.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s).map(Self)
    }
}

/// A persisted user profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub wallet: Option<String>,
    pub card_number: Option<String>,
    pub language: Language,
    pub successful_deals: i64,
}

impl User {
    /// A profile that has never been written.
    pub fn new(id: UserId) -> Self {
        Self {
            id,
            wallet: None,
            card_number: None,
            language: Language::default(),
            successful_deals: 0,
        }
    }

    /// At least one payment method is required to publish a deal.
    pub fn has_payment_method(&self) -> bool {
        self.wallet.is_some() || self.card_number.is_some()
    }
}

/// Partial user update. `None` fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    pub wallet: Option<String>,
    pub card_number: Option<String>,
    pub language: Option<Language>,
    pub successful_deals: Option<i64>,
}

/// A persisted deal record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deal {
    pub id: DealId,
    pub seller_id: UserId,
    /// Seller display name captured at creation; not kept in sync.
    pub seller_name: String,
    pub buyer_id: Option<UserId>,
    pub amount: Amount,
    pub rail: PaymentRail,
    pub offer: String,
    pub status: DealStatus,
    pub successful: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// The fields a seller submits when publishing a deal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDeal {
    pub seller_id: UserId,
    pub seller_name: String,
    pub amount: Amount,
    pub offer: String,
    pub rail: PaymentRail,
}

impl NewDeal {
    /// Materializes an open, unclaimed deal under a fresh id.
    pub fn into_deal(self, id: DealId) -> Deal {
        let now = timestamp_now();
        Deal {
            id,
            seller_id: self.seller_id,
            seller_name: self.seller_name,
            buyer_id: None,
            amount: self.amount,
            rail: self.rail,
            offer: self.offer,
            status: DealStatus::Open,
            successful: false,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

/// Partial deal update applied by the store's single-row update primitive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DealPatch {
    pub buyer_id: Option<UserId>,
    pub status: Option<DealStatus>,
    pub successful: Option<bool>,
    pub amount: Option<Amount>,
    pub offer: Option<String>,
}

/// A guarded lifecycle write executed by the store in one transaction.
///
/// Every transition requires the row to be `Open` when the transaction reads
/// it; otherwise nothing is written and the current row is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DealTransition {
    /// Attach `buyer`. Also requires the buyer slot to be empty or already
    /// held by `buyer`, and `buyer` to differ from the seller.
    Claim { buyer: UserId },
    /// Mark completed and successful, and increment the seller's counter.
    Complete,
    /// Mark cancelled, keeping the row.
    Cancel,
    /// Delete the row.
    Purge,
}

impl DealTransition {
    /// Whether the guard of this transition holds for `deal` as stored.
    pub fn permits(&self, deal: &Deal) -> bool {
        if deal.status != DealStatus::Open {
            return false;
        }
        match self {
            DealTransition::Claim { buyer } => {
                *buyer != deal.seller_id && deal.buyer_id.is_none_or(|current| current == *buyer)
            }
            DealTransition::Complete | DealTransition::Cancel | DealTransition::Purge => true,
        }
    }
}

/// Result of [`DealTransition`] application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// The write was committed. Holds the row after the write (or the row as
    /// it was before deletion, for `Purge`).
    Applied(Deal),
    /// The guard did not hold; nothing was written. Holds the current row.
    Stale(Deal),
    /// No row exists under the id.
    Missing,
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Channel,
    Storage,
}

/// Current UTC time in the ISO-8601 millisecond format used by the store.
pub fn timestamp_now() -> String {
    chrono::Utc::now()
        .format("%Y-%m-%dT%H:%M:%S%.3fZ")
        .to_string()
}
