// SPDX-FileCopyrightText: 2026 Guarantor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deal lifecycle engine.
//!
//! The engine is the only component that changes a deal's buyer or status.
//! Every mutation runs under the per-deal lock and is written through
//! [`DealStore::apply_transition`], whose guard re-checks the row inside the
//! store transaction.

use std::sync::Arc;

use guarantor_config::model::DealsConfig;
use guarantor_core::{
    Deal, DealId, DealStatus, DealStore, DealTransition, GuarantorError, InputField, NewDeal,
    TransitionOutcome, UserId, UserPatch,
};
use tracing::{info, warn};

use crate::locks::DealLocks;

/// Lifecycle policy knobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DealSettings {
    /// Cancel keeps the row as `cancelled` instead of deleting it.
    pub preserve_cancelled: bool,
    /// Users may overwrite their own successful-deal counter.
    pub allow_count_override: bool,
}

impl Default for DealSettings {
    fn default() -> Self {
        Self {
            preserve_cancelled: true,
            allow_count_override: false,
        }
    }
}

impl From<&DealsConfig> for DealSettings {
    fn from(config: &DealsConfig) -> Self {
        Self {
            preserve_cancelled: config.preserve_cancelled,
            allow_count_override: config.allow_count_override,
        }
    }
}

/// Result of a successful claim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claim {
    pub deal: Deal,
    /// Seller's successful-deal count, shown to the buyer.
    pub seller_deals: i64,
    /// Seller's card on file, the payment destination on the card rail.
    pub seller_card: Option<String>,
    /// `false` when the buyer was already attached (repeated claim).
    pub newly_claimed: bool,
}

/// Result of a successful completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub deal: Deal,
    /// `false` when the deal was already completed; nothing was written.
    pub newly_completed: bool,
}

/// Owns deal creation, claim arbitration and status transitions.
pub struct DealEngine {
    store: Arc<dyn DealStore>,
    locks: DealLocks,
    settings: DealSettings,
}

impl DealEngine {
    pub fn new(store: Arc<dyn DealStore>, settings: DealSettings) -> Self {
        Self {
            store,
            locks: DealLocks::new(),
            settings,
        }
    }

    pub fn settings(&self) -> &DealSettings {
        &self.settings
    }

    /// Publishes a new open deal under a fresh random id.
    pub async fn create_deal(&self, new_deal: NewDeal) -> Result<Deal, GuarantorError> {
        let deal = new_deal.into_deal(DealId::generate());
        self.store.insert_deal(&deal).await?;
        info!(
            deal_id = %deal.id,
            seller_id = %deal.seller_id,
            rail = %deal.rail,
            amount = %deal.amount,
            "deal created"
        );
        Ok(deal)
    }

    /// Fetches a deal by an externally supplied id (`#` marker and
    /// surrounding whitespace are ignored).
    pub async fn lookup(&self, raw_id: &str) -> Result<Option<Deal>, GuarantorError> {
        self.store.get_deal(&DealId::normalize(raw_id)).await
    }

    /// Attaches `buyer` to an open deal.
    ///
    /// Checks run in order: existence, open status, self-trade, then the
    /// buyer slot. Claiming again as the attached buyer succeeds without a write.
    pub async fn claim_deal(&self, raw_id: &str, buyer: UserId) -> Result<Claim, GuarantorError> {
        let id = DealId::normalize(raw_id);
        let result = self.claim_locked(&id, buyer).await;
        match &result {
            Ok(claim) if claim.newly_claimed => {
                info!(deal_id = %id, buyer_id = %buyer, seller_id = %claim.deal.seller_id, "deal claimed");
            }
            Ok(_) => {}
            Err(e) if e.is_recoverable() => {
                warn!(deal_id = %id, buyer_id = %buyer, error = %e, "claim rejected");
            }
            Err(_) => {}
        }
        result
    }

    async fn claim_locked(&self, id: &DealId, buyer: UserId) -> Result<Claim, GuarantorError> {
        let _guard = self.locks.acquire(id).await;

        let current = self.require(id).await?;
        if let Some(rejection) = claim_rejection(&current, buyer) {
            return Err(rejection);
        }

        let (deal, newly_claimed) = if current.buyer_id == Some(buyer) {
            (current, false)
        } else {
            match self
                .store
                .apply_transition(id, DealTransition::Claim { buyer })
                .await?
            {
                TransitionOutcome::Applied(deal) => (deal, true),
                TransitionOutcome::Stale(deal) => {
                    return Err(claim_rejection(&deal, buyer).unwrap_or_else(|| {
                        GuarantorError::Internal(format!("claim guard failed on deal #{id}"))
                    }));
                }
                TransitionOutcome::Missing => return Err(not_found(id)),
            }
        };

        let seller = self.store.get_user(deal.seller_id).await?;
        Ok(Claim {
            seller_deals: seller.as_ref().map_or(0, |s| s.successful_deals),
            seller_card: seller.and_then(|s| s.card_number),
            deal,
            newly_claimed,
        })
    }

    /// Marks an open deal completed and credits the seller, once.
    ///
    /// Completing an already completed deal succeeds with
    /// `newly_completed == false` and does not credit the seller again.
    pub async fn complete_deal(&self, raw_id: &str) -> Result<Completion, GuarantorError> {
        let id = DealId::normalize(raw_id);
        let _guard = self.locks.acquire(&id).await;
        self.complete_locked(&id).await
    }

    /// Buyer-side payment confirmation: only the attached buyer may complete.
    pub async fn confirm_payment(
        &self,
        raw_id: &str,
        buyer: UserId,
    ) -> Result<Completion, GuarantorError> {
        let id = DealId::normalize(raw_id);
        let _guard = self.locks.acquire(&id).await;

        let deal = self.require(&id).await?;
        if deal.buyer_id != Some(buyer) {
            warn!(deal_id = %id, user_id = %buyer, "payment confirmation from non-buyer");
            return Err(GuarantorError::Forbidden {
                deal_id: id.to_string(),
                reason: "only the attached buyer can confirm payment".to_string(),
            });
        }
        self.complete_locked(&id).await
    }

    async fn complete_locked(&self, id: &DealId) -> Result<Completion, GuarantorError> {
        match self
            .store
            .apply_transition(id, DealTransition::Complete)
            .await?
        {
            TransitionOutcome::Applied(deal) => {
                info!(
                    deal_id = %id,
                    seller_id = %deal.seller_id,
                    buyer_id = ?deal.buyer_id.map(|b| b.0),
                    "deal completed"
                );
                Ok(Completion {
                    deal,
                    newly_completed: true,
                })
            }
            TransitionOutcome::Stale(deal) if deal.status == DealStatus::Completed => {
                Ok(Completion {
                    deal,
                    newly_completed: false,
                })
            }
            TransitionOutcome::Stale(deal) => Err(not_open(&deal)),
            TransitionOutcome::Missing => Err(not_found(id)),
        }
    }

    /// Checks that `caller` may cancel the deal, without changing it.
    pub async fn check_cancel(&self, raw_id: &str, caller: UserId) -> Result<Deal, GuarantorError> {
        let id = DealId::normalize(raw_id);
        let deal = self.require(&id).await?;
        cancel_rejection(&deal, caller).map_or(Ok(deal), Err)
    }

    /// Withdraws an open deal. Only the seller may cancel.
    ///
    /// Returns the deal as it was last stored: with status `cancelled`, or
    /// with status `open` when the row was deleted instead.
    pub async fn cancel_deal(&self, raw_id: &str, caller: UserId) -> Result<Deal, GuarantorError> {
        let id = DealId::normalize(raw_id);
        let _guard = self.locks.acquire(&id).await;

        let deal = self.require(&id).await?;
        if let Some(rejection) = cancel_rejection(&deal, caller) {
            return Err(rejection);
        }

        let transition = if self.settings.preserve_cancelled {
            DealTransition::Cancel
        } else {
            DealTransition::Purge
        };
        match self.store.apply_transition(&id, transition).await? {
            TransitionOutcome::Applied(deal) => {
                info!(deal_id = %id, seller_id = %caller, purged = !self.settings.preserve_cancelled, "deal cancelled");
                Ok(deal)
            }
            TransitionOutcome::Stale(deal) => Err(not_open(&deal)),
            TransitionOutcome::Missing => Err(not_found(&id)),
        }
    }

    /// Overwrites a user's successful-deal counter, when enabled.
    pub async fn set_successful_deals(&self, user: UserId, count: i64) -> Result<(), GuarantorError> {
        if !self.settings.allow_count_override {
            return Err(GuarantorError::CountOverrideDisabled);
        }
        if count < 0 {
            return Err(GuarantorError::validation(
                InputField::DealCount,
                "count must not be negative",
            ));
        }
        self.store
            .upsert_user(
                user,
                UserPatch {
                    successful_deals: Some(count),
                    ..Default::default()
                },
            )
            .await?;
        info!(user_id = %user, count, "successful-deal count overridden");
        Ok(())
    }

    async fn require(&self, id: &DealId) -> Result<Deal, GuarantorError> {
        self.store
            .get_deal(id)
            .await?
            .ok_or_else(|| not_found(id))
    }
}

fn not_found(id: &DealId) -> GuarantorError {
    GuarantorError::NotFound {
        deal_id: id.to_string(),
    }
}

fn not_open(deal: &Deal) -> GuarantorError {
    GuarantorError::NotOpen {
        deal_id: deal.id.to_string(),
        status: deal.status,
    }
}

/// Why `buyer` may not claim `deal`, if anything.
fn claim_rejection(deal: &Deal, buyer: UserId) -> Option<GuarantorError> {
    if deal.status != DealStatus::Open {
        return Some(not_open(deal));
    }
    if deal.seller_id == buyer {
        return Some(GuarantorError::SelfTrade {
            deal_id: deal.id.to_string(),
        });
    }
    match deal.buyer_id {
        Some(current) if current != buyer => Some(GuarantorError::AlreadyClaimed {
            deal_id: deal.id.to_string(),
        }),
        _ => None,
    }
}

fn cancel_rejection(deal: &Deal, caller: UserId) -> Option<GuarantorError> {
    if deal.seller_id != caller {
        return Some(GuarantorError::Forbidden {
            deal_id: deal.id.to_string(),
            reason: "only the seller can cancel".to_string(),
        });
    }
    if deal.status != DealStatus::Open {
        return Some(not_open(deal));
    }
    None
}
