// SPDX-FileCopyrightText: 2026 Guarantor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end scenarios.
//!
//! `TestHarness` assembles the complete engine stack (SQLite store, deal
//! engine, session controller, dispatcher and outbox) over a temp database,
//! with a [`MockGateway`] in place of the messaging platform.

use std::sync::Arc;

use guarantor_config::model::StorageConfig;
use guarantor_core::{
    Action, DealStore, Delivery, GuarantorError, InboundEvent, StorageAdapter, UserId, UserPatch,
};
use guarantor_engine::{
    DealEngine, DealSettings, DispatchSettings, Dispatcher, MemorySessionStore, Outbox,
    SessionController,
};
use guarantor_storage::SqliteStorage;
use tokio::task::JoinHandle;

use crate::mock_gateway::MockGateway;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    deal_settings: DealSettings,
    dispatch_settings: DispatchSettings,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            deal_settings: DealSettings::default(),
            dispatch_settings: DispatchSettings {
                bot_username: Some("escrow_test_bot".to_string()),
                escrow_wallet: Some("EQ-escrow-wallet".to_string()),
                stars_recipient: Some("@stars_desk".to_string()),
            },
        }
    }

    /// Override the deal lifecycle policy.
    pub fn with_deal_settings(mut self, settings: DealSettings) -> Self {
        self.deal_settings = settings;
        self
    }

    /// Override the bot username and payment destinations.
    pub fn with_dispatch_settings(mut self, settings: DispatchSettings) -> Self {
        self.dispatch_settings = settings;
        self
    }

    /// Build the test harness, creating all required subsystems.
    pub async fn build(self) -> Result<TestHarness, GuarantorError> {
        let temp_dir = tempfile::TempDir::new().map_err(GuarantorError::storage)?;
        let db_path = temp_dir.path().join("test.db");

        let storage = Arc::new(SqliteStorage::new(StorageConfig {
            database_path: db_path.to_string_lossy().to_string(),
            wal_mode: true,
        }));
        storage.initialize().await?;

        let engine = Arc::new(DealEngine::new(storage.clone(), self.deal_settings));
        let controller = Arc::new(SessionController::new(
            Arc::new(MemorySessionStore::new()),
            storage.clone(),
            engine.clone(),
        ));

        let gateway = Arc::new(MockGateway::new());
        let (outbox, outbox_handle) = Outbox::spawn(gateway.clone());
        let dispatcher = Arc::new(Dispatcher::new(
            controller.clone(),
            engine.clone(),
            storage.clone(),
            self.dispatch_settings,
            outbox,
        ));

        Ok(TestHarness {
            storage,
            engine,
            controller,
            dispatcher,
            gateway,
            outbox_handle,
            _temp_dir: temp_dir,
        })
    }
}

/// A fully wired engine stack over a temp SQLite database.
pub struct TestHarness {
    pub storage: Arc<SqliteStorage>,
    pub engine: Arc<DealEngine>,
    pub controller: Arc<SessionController>,
    pub dispatcher: Arc<Dispatcher>,
    pub gateway: Arc<MockGateway>,
    outbox_handle: JoinHandle<()>,
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Default harness.
    pub async fn new() -> Result<Self, GuarantorError> {
        Self::builder().build().await
    }

    /// Handles one action from `user` and returns the resulting deliveries
    /// without going through the outbox.
    pub async fn send(&self, user: UserId, name: &str, action: Action) -> Vec<Delivery> {
        let event = InboundEvent::new(user, Some(name.to_string()), action);
        self.dispatcher.handle(event).await
    }

    /// Dispatches one action through the outbox to the mock gateway.
    pub async fn dispatch(&self, user: UserId, name: &str, action: Action) {
        let event = InboundEvent::new(user, Some(name.to_string()), action);
        self.dispatcher.dispatch(event).await;
    }

    /// Writes profile fields directly to the store.
    pub async fn seed_user(&self, user: UserId, patch: UserPatch) -> Result<(), GuarantorError> {
        self.storage.upsert_user(user, patch).await
    }

    /// Stops the outbox after flushing pending deliveries and closes the store.
    ///
    /// Waits for the delivery task only when no other dispatcher handle is
    /// alive; otherwise the queue stays open and the task is left running.
    pub async fn shutdown(self) -> Result<(), GuarantorError> {
        let TestHarness {
            storage,
            engine,
            controller,
            dispatcher,
            outbox_handle,
            ..
        } = self;
        drop((engine, controller));
        if Arc::try_unwrap(dispatcher).is_ok() {
            outbox_handle
                .await
                .map_err(|e| GuarantorError::Internal(format!("outbox task failed: {e}")))?;
        }
        storage.close().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use guarantor_core::{Notice, PaymentRail};
    use std::time::Duration;

    const SELLER: UserId = UserId(100);

    #[tokio::test]
    async fn builder_creates_working_environment() {
        let harness = TestHarness::new().await.unwrap();
        let deliveries = harness
            .send(SELLER, "seller", Action::Start { payload: None })
            .await;
        assert_eq!(deliveries.len(), 1);
        assert_eq!(deliveries[0].notice, Notice::Welcome);
    }

    #[tokio::test]
    async fn dispatch_reaches_the_gateway() {
        let harness = TestHarness::new().await.unwrap();
        harness.dispatch(SELLER, "seller", Action::Menu).await;
        assert!(harness.gateway.wait_for(1, Duration::from_secs(5)).await);
        assert_eq!(harness.gateway.notices_for(SELLER).await, vec![Notice::Welcome]);
    }

    #[tokio::test]
    async fn seeded_user_can_create_deals() {
        let harness = TestHarness::new().await.unwrap();
        harness
            .seed_user(
                SELLER,
                UserPatch {
                    card_number: Some("4111111111111111".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let deliveries = harness.send(SELLER, "seller", Action::CreateDeal).await;
        assert_eq!(deliveries[0].notice, Notice::ChoosePayMethod);
        let deliveries = harness
            .send(SELLER, "seller", Action::ChooseRail(PaymentRail::Card))
            .await;
        assert_eq!(
            deliveries[0].notice,
            Notice::PromptAmount {
                rail: PaymentRail::Card
            }
        );
    }

    #[tokio::test]
    async fn temp_db_is_unique_per_harness() {
        let first = TestHarness::new().await.unwrap();
        let second = TestHarness::new().await.unwrap();
        first
            .seed_user(SELLER, UserPatch::default())
            .await
            .unwrap();
        assert!(first.storage.get_user(SELLER).await.unwrap().is_some());
        assert!(second.storage.get_user(SELLER).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn shutdown_flushes_outbox() {
        let harness = TestHarness::new().await.unwrap();
        let gateway = harness.gateway.clone();
        harness.dispatch(SELLER, "seller", Action::Menu).await;
        harness.shutdown().await.unwrap();
        assert_eq!(gateway.deliveries().await.len(), 1);
    }
}
