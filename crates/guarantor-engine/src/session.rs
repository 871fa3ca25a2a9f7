// SPDX-FileCopyrightText: 2026 Guarantor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation controller.
//!
//! Advances a user's conversation state machine, validates step-local input
//! and hands completed drafts to the [`DealEngine`]. Every state change is a
//! compare-and-swap against the state the controller read; on conflict the
//! step is re-evaluated against the fresh state.

use std::sync::Arc;

use guarantor_core::{
    Amount, Conversation, Deal, DealDraft, DealStore, GuarantorError, PaymentRail, SessionStore,
    UserId, UserPatch,
};
use tracing::{debug, warn};

use crate::deal::DealEngine;
use crate::validate;

/// What a free-text message accomplished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextOutcome {
    /// No step expects text; nothing changed.
    Ignored,
    WalletSaved,
    CardSaved,
    /// The amount was accepted and the offer description is next.
    AmountAccepted { rail: PaymentRail, amount: Amount },
    DealCreated(Deal),
}

/// Drives per-user conversations.
pub struct SessionController {
    sessions: Arc<dyn SessionStore>,
    store: Arc<dyn DealStore>,
    engine: Arc<DealEngine>,
}

impl SessionController {
    pub fn new(
        sessions: Arc<dyn SessionStore>,
        store: Arc<dyn DealStore>,
        engine: Arc<DealEngine>,
    ) -> Self {
        Self {
            sessions,
            store,
            engine,
        }
    }

    /// Current conversation state of `user`.
    pub fn state(&self, user: UserId) -> Conversation {
        self.sessions.load(user)
    }

    /// Returns to idle from any state.
    pub fn back_to_menu(&self, user: UserId) {
        self.sessions.reset(user);
    }

    /// Starts wallet entry. Returns the wallet currently on file.
    pub async fn begin_wallet(&self, user: UserId) -> Result<Option<String>, GuarantorError> {
        self.leave_idle(user, Conversation::AwaitingWallet, "add a wallet")?;
        Ok(self.profile_field(user, |p| p.wallet).await)
    }

    /// Starts card entry. Returns the card currently on file.
    pub async fn begin_card(&self, user: UserId) -> Result<Option<String>, GuarantorError> {
        self.leave_idle(user, Conversation::AwaitingCard, "add a card")?;
        Ok(self.profile_field(user, |p| p.card_number).await)
    }

    /// Starts deal creation. Requires a wallet or card on file.
    pub async fn begin_deal(&self, user: UserId) -> Result<(), GuarantorError> {
        let state = self.sessions.load(user);
        if !state.is_idle() {
            return Err(invalid(state, "create a deal"));
        }
        let has_method = self
            .store
            .get_user(user)
            .await?
            .is_some_and(|profile| profile.has_payment_method());
        if !has_method {
            return Err(GuarantorError::NoPaymentMethod);
        }
        self.leave_idle(user, Conversation::AwaitingPayMethod, "create a deal")
    }

    /// Selects the payment rail of the draft.
    pub fn choose_rail(&self, user: UserId, rail: PaymentRail) -> Result<(), GuarantorError> {
        let next = Conversation::AwaitingAmount { rail };
        if self
            .sessions
            .compare_and_swap(user, &Conversation::AwaitingPayMethod, next)
        {
            debug!(user_id = %user, state = %next, "conversation advanced");
            Ok(())
        } else {
            Err(invalid(self.sessions.load(user), "choose a payment method"))
        }
    }

    /// Interprets free text according to the current step.
    ///
    /// Validation failures leave the state unchanged so the step can be
    /// retried. While idle, text is ignored.
    pub async fn submit_text(
        &self,
        user: UserId,
        seller_name: &str,
        text: &str,
    ) -> Result<TextOutcome, GuarantorError> {
        loop {
            let state = self.sessions.load(user);
            match state {
                Conversation::Idle => return Ok(TextOutcome::Ignored),
                Conversation::AwaitingPayMethod => {
                    return Err(invalid(state, "send text"));
                }
                Conversation::AwaitingWallet => {
                    let wallet = validate::wallet(text)?;
                    if !self.sessions.compare_and_swap(user, &state, Conversation::Idle) {
                        continue;
                    }
                    let patch = UserPatch {
                        wallet: Some(wallet),
                        ..Default::default()
                    };
                    self.save_profile(user, state, patch).await?;
                    return Ok(TextOutcome::WalletSaved);
                }
                Conversation::AwaitingCard => {
                    let card = validate::card(text)?;
                    if !self.sessions.compare_and_swap(user, &state, Conversation::Idle) {
                        continue;
                    }
                    let patch = UserPatch {
                        card_number: Some(card),
                        ..Default::default()
                    };
                    self.save_profile(user, state, patch).await?;
                    return Ok(TextOutcome::CardSaved);
                }
                Conversation::AwaitingAmount { rail } => {
                    let amount = Amount::parse(text, rail)?;
                    let next = Conversation::AwaitingOffer(DealDraft::new(rail, amount));
                    if !self.sessions.compare_and_swap(user, &state, next) {
                        continue;
                    }
                    debug!(user_id = %user, state = %next, "conversation advanced");
                    return Ok(TextOutcome::AmountAccepted { rail, amount });
                }
                Conversation::AwaitingOffer(draft) => {
                    let offer = validate::offer(text)?;
                    // Leave the step before inserting so a duplicated
                    // submission finds the conversation idle.
                    if !self.sessions.compare_and_swap(user, &state, Conversation::Idle) {
                        continue;
                    }
                    let new_deal = draft.finish(user, seller_name.to_string(), offer);
                    return match self.engine.create_deal(new_deal).await {
                        Ok(deal) => Ok(TextOutcome::DealCreated(deal)),
                        Err(e) => {
                            self.restore(user, state);
                            Err(e)
                        }
                    };
                }
            }
        }
    }

    fn leave_idle(
        &self,
        user: UserId,
        next: Conversation,
        action: &str,
    ) -> Result<(), GuarantorError> {
        if self.sessions.compare_and_swap(user, &Conversation::Idle, next) {
            debug!(user_id = %user, state = %next, "conversation advanced");
            Ok(())
        } else {
            Err(invalid(self.sessions.load(user), action))
        }
    }

    async fn save_profile(
        &self,
        user: UserId,
        previous: Conversation,
        patch: UserPatch,
    ) -> Result<(), GuarantorError> {
        if let Err(e) = self.store.upsert_user(user, patch).await {
            self.restore(user, previous);
            return Err(e);
        }
        debug!(user_id = %user, "payment method saved");
        Ok(())
    }

    /// Puts the step back after a failed side effect, unless the user has
    /// already moved on.
    fn restore(&self, user: UserId, previous: Conversation) {
        if !self
            .sessions
            .compare_and_swap(user, &Conversation::Idle, previous)
        {
            warn!(user_id = %user, "conversation changed before step could be restored");
        }
    }

    async fn profile_field(
        &self,
        user: UserId,
        field: impl FnOnce(guarantor_core::User) -> Option<String>,
    ) -> Option<String> {
        match self.store.get_user(user).await {
            Ok(profile) => profile.and_then(field),
            Err(e) => {
                warn!(user_id = %user, error = %e, "profile lookup failed");
                None
            }
        }
    }
}

fn invalid(state: Conversation, action: &str) -> GuarantorError {
    GuarantorError::InvalidTransition {
        state: state.to_string(),
        action: action.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use guarantor_config::model::StorageConfig;
    use guarantor_core::{DealStatus, InputField, StorageAdapter};
    use guarantor_storage::SqliteStorage;
    use tempfile::{TempDir, tempdir};

    use crate::deal::DealSettings;
    use crate::session_store::MemorySessionStore;

    const SELLER: UserId = UserId(10);

    async fn controller() -> (TempDir, Arc<SqliteStorage>, SessionController) {
        let dir = tempdir().unwrap();
        let storage = Arc::new(SqliteStorage::new(StorageConfig {
            database_path: dir.path().join("session.db").to_str().unwrap().to_string(),
            wal_mode: true,
        }));
        storage.initialize().await.unwrap();
        let engine = Arc::new(DealEngine::new(storage.clone(), DealSettings::default()));
        let controller =
            SessionController::new(Arc::new(MemorySessionStore::new()), storage.clone(), engine);
        (dir, storage, controller)
    }

    async fn with_card(storage: &SqliteStorage, user: UserId) {
        storage
            .upsert_user(
                user,
                UserPatch {
                    card_number: Some("4111111111111111".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn idle_text_is_ignored() {
        let (_dir, _storage, controller) = controller().await;
        let outcome = controller.submit_text(SELLER, "s", "hello").await.unwrap();
        assert_eq!(outcome, TextOutcome::Ignored);
        assert!(controller.state(SELLER).is_idle());
    }

    #[tokio::test]
    async fn wallet_step_saves_and_returns_to_idle() {
        let (_dir, storage, controller) = controller().await;
        assert_eq!(controller.begin_wallet(SELLER).await.unwrap(), None);
        assert_eq!(controller.state(SELLER), Conversation::AwaitingWallet);

        let err = controller
            .submit_text(SELLER, "s", &"a".repeat(47))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            GuarantorError::Validation {
                field: InputField::Wallet,
                ..
            }
        ));
        assert_eq!(controller.state(SELLER), Conversation::AwaitingWallet);

        let wallet = "a".repeat(48);
        let outcome = controller.submit_text(SELLER, "s", &wallet).await.unwrap();
        assert_eq!(outcome, TextOutcome::WalletSaved);
        assert!(controller.state(SELLER).is_idle());
        let profile = storage.get_user(SELLER).await.unwrap().unwrap();
        assert_eq!(profile.wallet, Some(wallet.clone()));

        assert_eq!(controller.begin_wallet(SELLER).await.unwrap(), Some(wallet));
    }

    #[tokio::test]
    async fn card_step_stores_bare_digits() {
        let (_dir, storage, controller) = controller().await;
        controller.begin_card(SELLER).await.unwrap();
        let outcome = controller
            .submit_text(SELLER, "s", "4111 1111 1111 1111")
            .await
            .unwrap();
        assert_eq!(outcome, TextOutcome::CardSaved);
        let profile = storage.get_user(SELLER).await.unwrap().unwrap();
        assert_eq!(profile.card_number.as_deref(), Some("4111111111111111"));
    }

    #[tokio::test]
    async fn deal_creation_requires_payment_method() {
        let (_dir, _storage, controller) = controller().await;
        let err = controller.begin_deal(SELLER).await.unwrap_err();
        assert!(matches!(err, GuarantorError::NoPaymentMethod));
        assert!(controller.state(SELLER).is_idle());
    }

    #[tokio::test]
    async fn full_deal_creation_flow() {
        let (_dir, storage, controller) = controller().await;
        with_card(&storage, SELLER).await;

        controller.begin_deal(SELLER).await.unwrap();
        controller.choose_rail(SELLER, PaymentRail::Card).unwrap();

        let bad = controller.submit_text(SELLER, "s", "-3").await.unwrap_err();
        assert!(matches!(
            bad,
            GuarantorError::Validation {
                field: InputField::Amount,
                ..
            }
        ));
        let accepted = controller.submit_text(SELLER, "s", "199,99").await.unwrap();
        assert!(matches!(
            accepted,
            TextOutcome::AmountAccepted {
                rail: PaymentRail::Card,
                ..
            }
        ));

        let no_link = controller
            .submit_text(SELLER, "s", "a nice gift")
            .await
            .unwrap_err();
        assert!(matches!(
            no_link,
            GuarantorError::Validation {
                field: InputField::Offer,
                ..
            }
        ));
        assert!(matches!(
            controller.state(SELLER),
            Conversation::AwaitingOffer(_)
        ));

        let created = controller
            .submit_text(SELLER, "seller_handle", "https://t.me/nft/PlushPepe-1")
            .await
            .unwrap();
        let deal = match created {
            TextOutcome::DealCreated(deal) => deal,
            other => panic!("expected a deal, got {other:?}"),
        };
        assert_eq!(deal.seller_id, SELLER);
        assert_eq!(deal.seller_name, "seller_handle");
        assert_eq!(deal.status, DealStatus::Open);
        assert_eq!(deal.amount.display_for(PaymentRail::Card), "199.99");
        assert!(controller.state(SELLER).is_idle());
    }

    #[tokio::test]
    async fn stars_amount_must_be_whole() {
        let (_dir, storage, controller) = controller().await;
        with_card(&storage, SELLER).await;
        controller.begin_deal(SELLER).await.unwrap();
        controller.choose_rail(SELLER, PaymentRail::Stars).unwrap();
        assert!(controller.submit_text(SELLER, "s", "1.5").await.is_err());
        assert!(controller.submit_text(SELLER, "s", "150").await.is_ok());
    }

    #[tokio::test]
    async fn duplicate_offer_submission_creates_one_deal() {
        let (_dir, storage, controller) = controller().await;
        with_card(&storage, SELLER).await;
        controller.begin_deal(SELLER).await.unwrap();
        controller.choose_rail(SELLER, PaymentRail::Wallet).unwrap();
        controller.submit_text(SELLER, "s", "5").await.unwrap();

        let offer = "https://t.me/nft/PlushPepe-1";
        let (a, b) = tokio::join!(
            controller.submit_text(SELLER, "s", offer),
            controller.submit_text(SELLER, "s", offer)
        );
        let created = [a.unwrap(), b.unwrap()]
            .into_iter()
            .filter(|o| matches!(o, TextOutcome::DealCreated(_)))
            .count();
        assert_eq!(created, 1);
    }

    #[tokio::test]
    async fn out_of_order_actions_leave_state_unchanged() {
        let (_dir, storage, controller) = controller().await;
        with_card(&storage, SELLER).await;

        let err = controller.choose_rail(SELLER, PaymentRail::Card).unwrap_err();
        assert!(matches!(err, GuarantorError::InvalidTransition { .. }));
        assert!(controller.state(SELLER).is_idle());

        controller.begin_wallet(SELLER).await.unwrap();
        let err = controller.begin_deal(SELLER).await.unwrap_err();
        assert!(matches!(err, GuarantorError::InvalidTransition { .. }));
        assert_eq!(controller.state(SELLER), Conversation::AwaitingWallet);

        controller.back_to_menu(SELLER);
        assert!(controller.state(SELLER).is_idle());
    }

    #[tokio::test]
    async fn text_while_choosing_rail_is_invalid() {
        let (_dir, storage, controller) = controller().await;
        with_card(&storage, SELLER).await;
        controller.begin_deal(SELLER).await.unwrap();
        let err = controller.submit_text(SELLER, "s", "100").await.unwrap_err();
        assert!(matches!(err, GuarantorError::InvalidTransition { .. }));
        assert_eq!(controller.state(SELLER), Conversation::AwaitingPayMethod);
    }
}
