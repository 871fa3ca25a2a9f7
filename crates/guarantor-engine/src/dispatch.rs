// SPDX-FileCopyrightText: 2026 Guarantor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Routes inbound events to the controller and the engine, and turns the
//! results into notices for every affected user.

use std::collections::HashMap;
use std::sync::Arc;

use guarantor_config::GuarantorConfig;
use guarantor_core::{
    Action, Deal, DealId, DealStatus, DealStore, Delivery, GuarantorError, InboundEvent,
    Language, Notice, PaymentRail, Rejection, UserId, UserPatch,
};
use tracing::{debug, error};

use crate::deal::{Claim, Completion, DealEngine};
use crate::link;
use crate::outbox::Outbox;
use crate::session::{SessionController, TextOutcome};

/// Invoice payload prefix of stars payments.
pub const PAYMENT_PAYLOAD_PREFIX: &str = "deal_";

/// Presentation settings the dispatcher needs to fill in notices.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchSettings {
    /// Bot username for deep links. Without it, links fall back to `/buy <id>`.
    pub bot_username: Option<String>,
    pub escrow_wallet: Option<String>,
    pub stars_recipient: Option<String>,
}

impl From<&GuarantorConfig> for DispatchSettings {
    fn from(config: &GuarantorConfig) -> Self {
        Self {
            bot_username: config.telegram.bot_username.clone(),
            escrow_wallet: config.deals.escrow_wallet.clone(),
            stars_recipient: config.deals.stars_recipient.clone(),
        }
    }
}

/// Notices produced while handling one event, before localization.
type Replies = Vec<(UserId, Notice)>;

pub struct Dispatcher {
    controller: Arc<SessionController>,
    engine: Arc<DealEngine>,
    store: Arc<dyn DealStore>,
    settings: DispatchSettings,
    outbox: Outbox,
}

impl Dispatcher {
    pub fn new(
        controller: Arc<SessionController>,
        engine: Arc<DealEngine>,
        store: Arc<dyn DealStore>,
        settings: DispatchSettings,
        outbox: Outbox,
    ) -> Self {
        Self {
            controller,
            engine,
            store,
            settings,
            outbox,
        }
    }

    /// Handles the event and posts the resulting notices to the outbox.
    pub async fn dispatch(&self, event: InboundEvent) {
        for delivery in self.handle(event).await {
            self.outbox.post(delivery);
        }
    }

    /// Handles the event and returns the notices it produced.
    ///
    /// Never fails: lifecycle and validation errors become a rejection
    /// notice for the acting user, faults become a generic failure notice.
    pub async fn handle(&self, event: InboundEvent) -> Vec<Delivery> {
        let user = event.user;
        let mut replies = Replies::new();
        if let Err(e) = self.route(&event, &mut replies).await {
            let notice = match rejection_for(&e) {
                Some(rejection) => {
                    debug!(user_id = %user, error = %e, "action rejected");
                    Notice::Rejected(rejection)
                }
                None => {
                    error!(user_id = %user, error = %e, "request failed");
                    Notice::Failure
                }
            };
            replies.push((user, notice));
        }
        self.localize(replies).await
    }

    async fn route(&self, event: &InboundEvent, out: &mut Replies) -> Result<(), GuarantorError> {
        let user = event.user;
        match &event.action {
            Action::Start { payload } => {
                self.controller.back_to_menu(user);
                match payload.as_deref().and_then(link::parse_start_payload) {
                    Some(id) => self.claim(event, id.as_str(), out).await?,
                    None => out.push((user, Notice::Welcome)),
                }
            }
            Action::Menu => {
                self.controller.back_to_menu(user);
                out.push((user, Notice::Welcome));
            }
            Action::ManageWallets => out.push((user, Notice::ManageWallets)),
            Action::AddWallet => {
                let current = self.controller.begin_wallet(user).await?;
                out.push((user, Notice::PromptWallet { current }));
            }
            Action::AddCard => {
                let current = self.controller.begin_card(user).await?;
                out.push((user, Notice::PromptCard { current }));
            }
            Action::CreateDeal => {
                self.controller.begin_deal(user).await?;
                out.push((user, Notice::ChoosePayMethod));
            }
            Action::ChooseRail(rail) => {
                self.controller.choose_rail(user, *rail)?;
                out.push((user, Notice::PromptAmount { rail: *rail }));
            }
            Action::Text(text) => {
                let seller_name = event.display_name_or_unknown();
                match self.controller.submit_text(user, &seller_name, text).await? {
                    TextOutcome::Ignored => {}
                    TextOutcome::WalletSaved => out.push((user, Notice::WalletSaved)),
                    TextOutcome::CardSaved => out.push((user, Notice::CardSaved)),
                    TextOutcome::AmountAccepted { rail, amount } => {
                        out.push((user, Notice::PromptOffer { rail, amount }));
                    }
                    TextOutcome::DealCreated(deal) => {
                        let link = self.link_for(&deal);
                        out.push((user, Notice::DealCreated { deal, link }));
                    }
                }
            }
            Action::Claim(raw) => self.claim(event, raw, out).await?,
            Action::ConfirmPayment(raw) => {
                let completion = self.engine.confirm_payment(raw, user).await?;
                self.completed(event, completion, out);
            }
            Action::PaymentReceived { payload } => {
                let raw = payload
                    .strip_prefix(PAYMENT_PAYLOAD_PREFIX)
                    .ok_or_else(|| {
                        GuarantorError::Internal(format!("unrecognized payment payload `{payload}`"))
                    })?;
                let completion = self.engine.confirm_payment(raw, user).await?;
                self.completed(event, completion, out);
            }
            Action::RequestCancel(raw) => {
                let deal = self.engine.check_cancel(raw, user).await?;
                out.push((user, Notice::ConfirmCancel { deal_id: deal.id }));
            }
            Action::Cancel(raw) => {
                let deal = self.engine.cancel_deal(raw, user).await?;
                if let Some(buyer) = deal.buyer_id {
                    out.push((
                        buyer,
                        Notice::DealCancelled {
                            deal_id: deal.id.clone(),
                        },
                    ));
                }
                out.push((user, Notice::DealCancelled { deal_id: deal.id }));
            }
            Action::LeaveDeal(raw) => {
                let deal = self.buyer_deal(raw, user).await?;
                self.controller.back_to_menu(user);
                if deal.status == DealStatus::Open {
                    out.push((
                        deal.seller_id,
                        Notice::BuyerLeft {
                            deal_id: deal.id.clone(),
                            buyer_name: event.display_name_or_unknown(),
                        },
                    ));
                }
                out.push((user, Notice::LeftDeal { deal_id: deal.id }));
            }
            Action::PayStars(raw) => {
                let deal = self.stars_deal(raw, user).await?;
                out.push((
                    user,
                    Notice::StarsPayment {
                        deal,
                        recipient: self.settings.stars_recipient.clone(),
                    },
                ));
            }
            Action::SetDealCount(count) => {
                self.engine.set_successful_deals(user, *count).await?;
                out.push((user, Notice::DealCountSet { count: *count }));
            }
            Action::ChangeLanguage(None) => out.push((user, Notice::ChooseLanguage)),
            Action::ChangeLanguage(Some(language)) => {
                let patch = UserPatch {
                    language: Some(*language),
                    ..Default::default()
                };
                self.store.upsert_user(user, patch).await?;
                self.controller.back_to_menu(user);
                out.push((
                    user,
                    Notice::LanguageChanged {
                        language: *language,
                    },
                ));
            }
            Action::Usage(hint) => out.push((user, Notice::Usage(*hint))),
        }
        Ok(())
    }

    async fn claim(
        &self,
        event: &InboundEvent,
        raw: &str,
        out: &mut Replies,
    ) -> Result<(), GuarantorError> {
        let Claim {
            deal,
            seller_deals,
            seller_card,
            newly_claimed,
        } = self.engine.claim_deal(raw, event.user).await?;

        let pay_to = match deal.rail {
            PaymentRail::Wallet => self.settings.escrow_wallet.clone(),
            PaymentRail::Stars => self.settings.stars_recipient.clone(),
            PaymentRail::Card => seller_card,
        };
        if newly_claimed {
            out.push((
                deal.seller_id,
                Notice::BuyerJoined {
                    deal_id: deal.id.clone(),
                    buyer_name: event.display_name_or_unknown(),
                },
            ));
        }
        out.push((
            event.user,
            Notice::DealSummary {
                deal,
                seller_deals,
                pay_to,
            },
        ));
        Ok(())
    }

    fn completed(&self, event: &InboundEvent, completion: Completion, out: &mut Replies) {
        out.push((event.user, Notice::PaymentAccepted));
        if completion.newly_completed {
            out.push((
                completion.deal.seller_id,
                Notice::PaymentConfirmed {
                    deal: completion.deal,
                    buyer_name: event.display_name_or_unknown(),
                },
            ));
        }
    }

    /// The claimed, open stars deal `raw` of `buyer`.
    /// The deal `buyer` is attached to, or why it is not theirs.
    async fn buyer_deal(&self, raw: &str, buyer: UserId) -> Result<Deal, GuarantorError> {
        let deal = self
            .engine
            .lookup(raw)
            .await?
            .ok_or_else(|| GuarantorError::NotFound {
                deal_id: DealId::normalize(raw).to_string(),
            })?;
        if deal.buyer_id != Some(buyer) {
            return Err(GuarantorError::Forbidden {
                deal_id: deal.id.to_string(),
                reason: "not the attached buyer".to_string(),
            });
        }
        Ok(deal)
    }

    async fn stars_deal(&self, raw: &str, buyer: UserId) -> Result<Deal, GuarantorError> {
        let deal = self.buyer_deal(raw, buyer).await?;
        if deal.status != DealStatus::Open {
            return Err(GuarantorError::NotOpen {
                deal_id: deal.id.to_string(),
                status: deal.status,
            });
        }
        if deal.rail != PaymentRail::Stars {
            return Err(GuarantorError::Forbidden {
                deal_id: deal.id.to_string(),
                reason: format!("deal is paid by {}", deal.rail),
            });
        }
        Ok(deal)
    }

    fn link_for(&self, deal: &Deal) -> String {
        match &self.settings.bot_username {
            Some(bot) => link::deal_link(bot, deal.rail, &deal.id),
            None => format!("/buy {}", deal.id),
        }
    }

    /// Attaches each recipient's language. Lookup failures fall back to
    /// the primary language.
    async fn localize(&self, replies: Replies) -> Vec<Delivery> {
        let mut languages: HashMap<UserId, Language> = HashMap::new();
        let mut deliveries = Vec::with_capacity(replies.len());
        for (user, notice) in replies {
            let language = match languages.get(&user) {
                Some(language) => *language,
                None => {
                    let language = match self.store.get_user(user).await {
                        Ok(profile) => profile.map(|p| p.language).unwrap_or_default(),
                        Err(e) => {
                            error!(user_id = %user, error = %e, "language lookup failed");
                            Language::default()
                        }
                    };
                    languages.insert(user, language);
                    language
                }
            };
            deliveries.push(Delivery {
                user,
                language,
                notice,
            });
        }
        deliveries
    }
}

/// The user-facing rejection for recoverable errors; `None` for faults.
pub fn rejection_for(error: &GuarantorError) -> Option<Rejection> {
    let rejection = match error {
        GuarantorError::NotFound { deal_id } => Rejection::NotFound {
            deal_id: deal_id.clone(),
        },
        GuarantorError::NotOpen { deal_id, .. } => Rejection::NotOpen {
            deal_id: deal_id.clone(),
        },
        GuarantorError::SelfTrade { .. } => Rejection::SelfTrade,
        GuarantorError::AlreadyClaimed { .. } => Rejection::AlreadyClaimed,
        GuarantorError::Forbidden { deal_id, .. } => Rejection::Forbidden {
            deal_id: deal_id.clone(),
        },
        GuarantorError::Validation { field, .. } => Rejection::InvalidInput(*field),
        GuarantorError::NoPaymentMethod => Rejection::NoPaymentMethod,
        GuarantorError::InvalidTransition { .. } => Rejection::InvalidStep,
        GuarantorError::CountOverrideDisabled => Rejection::CountOverrideDisabled,
        GuarantorError::Config(_)
        | GuarantorError::Storage { .. }
        | GuarantorError::Channel { .. }
        | GuarantorError::Internal(_) => return None,
    };
    Some(rejection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use guarantor_config::model::StorageConfig;
    use guarantor_core::{NotificationGateway, StorageAdapter, UsageHint};
    use guarantor_storage::SqliteStorage;
    use tempfile::{TempDir, tempdir};
    use tokio::sync::Mutex;

    use crate::deal::DealSettings;
    use crate::session_store::MemorySessionStore;

    const SELLER: UserId = UserId(1);
    const BUYER: UserId = UserId(2);

    #[derive(Default)]
    struct Recorder {
        sent: Mutex<Vec<Delivery>>,
    }

    #[async_trait]
    impl NotificationGateway for Recorder {
        async fn notify(&self, delivery: Delivery) -> Result<(), GuarantorError> {
            self.sent.lock().await.push(delivery);
            Ok(())
        }
    }

    struct Fixture {
        _dir: TempDir,
        storage: Arc<SqliteStorage>,
        dispatcher: Dispatcher,
        recorder: Arc<Recorder>,
    }

    async fn fixture(initialize: bool) -> Fixture {
        let dir = tempdir().unwrap();
        let storage = Arc::new(SqliteStorage::new(StorageConfig {
            database_path: dir.path().join("dispatch.db").to_str().unwrap().to_string(),
            wal_mode: true,
        }));
        if initialize {
            storage.initialize().await.unwrap();
        }
        let engine = Arc::new(DealEngine::new(storage.clone(), DealSettings::default()));
        let controller = Arc::new(SessionController::new(
            Arc::new(MemorySessionStore::new()),
            storage.clone(),
            engine.clone(),
        ));
        let recorder = Arc::new(Recorder::default());
        let (outbox, _handle) = Outbox::spawn(recorder.clone());
        let settings = DispatchSettings {
            bot_username: Some("escrow_bot".to_string()),
            escrow_wallet: Some("EQescrow".to_string()),
            stars_recipient: Some("stars_desk".to_string()),
        };
        let dispatcher = Dispatcher::new(controller, engine, storage.clone(), settings, outbox);
        Fixture {
            _dir: dir,
            storage,
            dispatcher,
            recorder,
        }
    }

    fn event(user: UserId, action: Action) -> InboundEvent {
        InboundEvent::new(user, Some(format!("user{}", user.0)), action)
    }

    async fn publish(f: &Fixture, rail: PaymentRail, amount: &str) -> Deal {
        f.storage
            .upsert_user(
                SELLER,
                UserPatch {
                    card_number: Some("4111111111111111".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let steps = [
            Action::CreateDeal,
            Action::ChooseRail(rail),
            Action::Text(amount.to_string()),
            Action::Text("https://t.me/nft/PlushPepe-1".to_string()),
        ];
        let mut last = Vec::new();
        for action in steps {
            last = f.dispatcher.handle(event(SELLER, action)).await;
        }
        match last.pop().map(|d| d.notice) {
            Some(Notice::DealCreated { deal, link }) => {
                assert_eq!(link, format!("https://t.me/escrow_bot?start=order_{rail}_{}", deal.id));
                deal
            }
            other => panic!("expected DealCreated, got {other:?}"),
        }
    }

    fn notice_for(deliveries: &[Delivery], user: UserId) -> Option<&Notice> {
        deliveries.iter().find(|d| d.user == user).map(|d| &d.notice)
    }

    #[tokio::test]
    async fn deep_link_claim_notifies_both_sides() {
        let f = fixture(true).await;
        let deal = publish(&f, PaymentRail::Card, "199.99").await;
        f.storage
            .upsert_user(
                SELLER,
                UserPatch {
                    language: Some(Language::En),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let payload = link::start_payload(deal.rail, &deal.id);
        let out = f
            .dispatcher
            .handle(event(
                BUYER,
                Action::Start {
                    payload: Some(payload),
                },
            ))
            .await;

        match notice_for(&out, BUYER) {
            Some(Notice::DealSummary { deal: d, pay_to, .. }) => {
                assert_eq!(d.id, deal.id);
                assert_eq!(pay_to.as_deref(), Some("4111111111111111"));
            }
            other => panic!("unexpected buyer notice: {other:?}"),
        }
        let seller = out.iter().find(|d| d.user == SELLER).unwrap();
        assert_eq!(seller.language, Language::En);
        assert!(matches!(seller.notice, Notice::BuyerJoined { .. }));
    }

    #[tokio::test]
    async fn wallet_claim_points_at_escrow() {
        let f = fixture(true).await;
        let deal = publish(&f, PaymentRail::Wallet, "2.5").await;
        let out = f
            .dispatcher
            .handle(event(BUYER, Action::Claim(format!("#{}", deal.id))))
            .await;
        assert!(matches!(
            notice_for(&out, BUYER),
            Some(Notice::DealSummary { pay_to: Some(p), .. }) if p == "EQescrow"
        ));
    }

    #[tokio::test]
    async fn lifecycle_errors_become_rejections() {
        let f = fixture(true).await;
        let deal = publish(&f, PaymentRail::Card, "10").await;

        let own = f
            .dispatcher
            .handle(event(SELLER, Action::Claim(deal.id.to_string())))
            .await;
        assert_eq!(
            notice_for(&own, SELLER),
            Some(&Notice::Rejected(Rejection::SelfTrade))
        );

        let missing = f
            .dispatcher
            .handle(event(BUYER, Action::Claim("zzzzzzzz".to_string())))
            .await;
        assert_eq!(
            notice_for(&missing, BUYER),
            Some(&Notice::Rejected(Rejection::NotFound {
                deal_id: "zzzzzzzz".to_string()
            }))
        );
    }

    #[tokio::test]
    async fn storage_faults_become_failure_notice() {
        let f = fixture(false).await;
        let out = f
            .dispatcher
            .handle(event(BUYER, Action::Claim("abcdefgh".to_string())))
            .await;
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].notice, Notice::Failure);
        assert_eq!(out[0].language, Language::Ru);
    }

    #[tokio::test]
    async fn confirmation_completes_and_notifies_seller_once() {
        let f = fixture(true).await;
        let deal = publish(&f, PaymentRail::Card, "10").await;
        f.dispatcher
            .handle(event(BUYER, Action::Claim(deal.id.to_string())))
            .await;

        let first = f
            .dispatcher
            .handle(event(BUYER, Action::ConfirmPayment(deal.id.to_string())))
            .await;
        assert_eq!(notice_for(&first, BUYER), Some(&Notice::PaymentAccepted));
        assert!(matches!(
            notice_for(&first, SELLER),
            Some(Notice::PaymentConfirmed { .. })
        ));

        let second = f
            .dispatcher
            .handle(event(BUYER, Action::ConfirmPayment(deal.id.to_string())))
            .await;
        assert!(notice_for(&second, SELLER).is_none());
        let seller = f.storage.get_user(SELLER).await.unwrap().unwrap();
        assert_eq!(seller.successful_deals, 1);
    }

    #[tokio::test]
    async fn stars_payment_receipt_completes_deal() {
        let f = fixture(true).await;
        let deal = publish(&f, PaymentRail::Stars, "150").await;
        f.dispatcher
            .handle(event(BUYER, Action::Claim(deal.id.to_string())))
            .await;

        let pay = f
            .dispatcher
            .handle(event(BUYER, Action::PayStars(deal.id.to_string())))
            .await;
        assert!(matches!(
            notice_for(&pay, BUYER),
            Some(Notice::StarsPayment { recipient: Some(r), .. }) if r == "stars_desk"
        ));

        let out = f
            .dispatcher
            .handle(event(
                BUYER,
                Action::PaymentReceived {
                    payload: format!("deal_{}", deal.id),
                },
            ))
            .await;
        assert_eq!(notice_for(&out, BUYER), Some(&Notice::PaymentAccepted));
        let stored = f.storage.get_deal(&deal.id).await.unwrap().unwrap();
        assert_eq!(stored.status, DealStatus::Completed);
    }

    #[tokio::test]
    async fn payment_receipt_from_non_buyer_is_forbidden() {
        let f = fixture(true).await;
        let deal = publish(&f, PaymentRail::Stars, "150").await;
        f.dispatcher
            .handle(event(BUYER, Action::Claim(deal.id.to_string())))
            .await;

        let stranger = UserId(3);
        let out = f
            .dispatcher
            .handle(event(
                stranger,
                Action::PaymentReceived {
                    payload: format!("deal_{}", deal.id),
                },
            ))
            .await;
        assert_eq!(
            notice_for(&out, stranger),
            Some(&Notice::Rejected(Rejection::Forbidden {
                deal_id: deal.id.to_string()
            }))
        );
        let stored = f.storage.get_deal(&deal.id).await.unwrap().unwrap();
        assert_eq!(stored.status, DealStatus::Open);
        let seller = f.storage.get_user(SELLER).await.unwrap().unwrap();
        assert_eq!(seller.successful_deals, 0);
    }

    #[tokio::test]
    async fn leaving_keeps_buyer_attached_and_tells_seller() {
        let f = fixture(true).await;
        let deal = publish(&f, PaymentRail::Card, "10").await;
        f.dispatcher
            .handle(event(BUYER, Action::Claim(deal.id.to_string())))
            .await;

        let out = f
            .dispatcher
            .handle(event(BUYER, Action::LeaveDeal(deal.id.to_string())))
            .await;
        assert_eq!(
            notice_for(&out, BUYER),
            Some(&Notice::LeftDeal {
                deal_id: deal.id.clone()
            })
        );
        assert_eq!(
            notice_for(&out, SELLER),
            Some(&Notice::BuyerLeft {
                deal_id: deal.id.clone(),
                buyer_name: "user2".to_string(),
            })
        );

        let stored = f.storage.get_deal(&deal.id).await.unwrap().unwrap();
        assert_eq!(stored.buyer_id, Some(BUYER));
        assert_eq!(stored.status, DealStatus::Open);

        let other = f
            .dispatcher
            .handle(event(UserId(3), Action::Claim(deal.id.to_string())))
            .await;
        assert_eq!(
            notice_for(&other, UserId(3)),
            Some(&Notice::Rejected(Rejection::AlreadyClaimed))
        );
    }

    #[tokio::test]
    async fn leaving_someone_elses_deal_is_forbidden() {
        let f = fixture(true).await;
        let deal = publish(&f, PaymentRail::Card, "10").await;

        let out = f
            .dispatcher
            .handle(event(BUYER, Action::LeaveDeal(deal.id.to_string())))
            .await;
        assert_eq!(
            notice_for(&out, BUYER),
            Some(&Notice::Rejected(Rejection::Forbidden {
                deal_id: deal.id.to_string()
            }))
        );
        assert!(notice_for(&out, SELLER).is_none());
    }

    #[tokio::test]
    async fn cancel_notifies_attached_buyer() {
        let f = fixture(true).await;
        let deal = publish(&f, PaymentRail::Card, "10").await;
        f.dispatcher
            .handle(event(BUYER, Action::Claim(deal.id.to_string())))
            .await;

        let ask = f
            .dispatcher
            .handle(event(SELLER, Action::RequestCancel(deal.id.to_string())))
            .await;
        assert!(matches!(
            notice_for(&ask, SELLER),
            Some(Notice::ConfirmCancel { .. })
        ));

        let out = f
            .dispatcher
            .handle(event(SELLER, Action::Cancel(deal.id.to_string())))
            .await;
        assert!(matches!(
            notice_for(&out, BUYER),
            Some(Notice::DealCancelled { .. })
        ));
        assert!(matches!(
            notice_for(&out, SELLER),
            Some(Notice::DealCancelled { .. })
        ));
    }

    #[tokio::test]
    async fn language_change_applies_to_the_reply() {
        let f = fixture(true).await;
        let out = f
            .dispatcher
            .handle(event(BUYER, Action::ChangeLanguage(Some(Language::En))))
            .await;
        assert_eq!(out[0].language, Language::En);
        assert_eq!(
            out[0].notice,
            Notice::LanguageChanged {
                language: Language::En
            }
        );
    }

    #[tokio::test]
    async fn idle_text_produces_no_reply() {
        let f = fixture(true).await;
        let out = f
            .dispatcher
            .handle(event(BUYER, Action::Text("hi".to_string())))
            .await;
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn dispatch_posts_to_gateway() {
        let f = fixture(true).await;
        f.dispatcher
            .dispatch(event(BUYER, Action::Usage(UsageHint::Buy)))
            .await;
        for _ in 0..50 {
            if !f.recorder.sent.lock().await.is_empty() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        let sent = f.recorder.sent.lock().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].notice, Notice::Usage(UsageHint::Buy));
    }

    #[test]
    fn faults_have_no_rejection() {
        assert_eq!(rejection_for(&GuarantorError::Internal("x".into())), None);
        assert_eq!(
            rejection_for(&GuarantorError::CountOverrideDisabled),
            Some(Rejection::CountOverrideDisabled)
        );
    }
}
