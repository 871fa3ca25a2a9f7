// SPDX-FileCopyrightText: 2026 Guarantor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the storage traits.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use guarantor_config::model::StorageConfig;
use guarantor_core::{
    AdapterType, Deal, DealId, DealPatch, DealStore, DealTransition, GuarantorError,
    HealthStatus, PluginAdapter, StorageAdapter, TransitionOutcome, User, UserId, UserPatch,
};

use crate::database::{Database, map_tr_err};
use crate::queries;

/// SQLite-backed deal store.
///
/// The database is opened by [`StorageAdapter::initialize`]; every other
/// operation fails with a storage error until then.
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    /// The connection is not opened until `initialize` is called.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    fn db(&self) -> Result<&Database, GuarantorError> {
        self.db.get().ok_or_else(|| GuarantorError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, GuarantorError> {
        let Some(db) = self.db.get() else {
            return Ok(HealthStatus::Unhealthy("not initialized".to_string()));
        };
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> { conn.query_row("SELECT 1", [], |_| Ok(())) })
            .await
            .map_err(map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), GuarantorError> {
        if let Some(db) = self.db.get() {
            db.checkpoint().await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    async fn initialize(&self) -> Result<(), GuarantorError> {
        let db = Database::open(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| GuarantorError::Storage {
            source: "storage already initialized".into(),
        })?;
        info!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), GuarantorError> {
        self.db()?.checkpoint().await?;
        debug!("WAL checkpoint complete");
        Ok(())
    }
}

#[async_trait]
impl DealStore for SqliteStorage {
    async fn upsert_user(&self, id: UserId, patch: UserPatch) -> Result<(), GuarantorError> {
        queries::users::upsert_user(self.db()?, id, patch).await
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, GuarantorError> {
        queries::users::get_user(self.db()?, id).await
    }

    async fn insert_deal(&self, deal: &Deal) -> Result<(), GuarantorError> {
        queries::deals::insert_deal(self.db()?, deal).await
    }

    async fn get_deal(&self, id: &DealId) -> Result<Option<Deal>, GuarantorError> {
        queries::deals::get_deal(self.db()?, id).await
    }

    async fn update_deal_fields(
        &self,
        id: &DealId,
        patch: DealPatch,
    ) -> Result<bool, GuarantorError> {
        queries::deals::update_deal_fields(self.db()?, id, patch).await
    }

    async fn delete_deal(&self, id: &DealId) -> Result<bool, GuarantorError> {
        queries::deals::delete_deal(self.db()?, id).await
    }

    async fn increment_successful_deals(&self, id: UserId) -> Result<(), GuarantorError> {
        queries::users::increment_successful_deals(self.db()?, id).await
    }

    async fn apply_transition(
        &self,
        id: &DealId,
        transition: DealTransition,
    ) -> Result<TransitionOutcome, GuarantorError> {
        queries::deals::apply_transition(self.db()?, id, transition).await
    }
}
