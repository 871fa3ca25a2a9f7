// SPDX-FileCopyrightText: 2026 Guarantor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistent store for users and deals.

use async_trait::async_trait;

use crate::error::GuarantorError;
use crate::traits::storage::StorageAdapter;
use crate::types::{
    Deal, DealId, DealPatch, DealTransition, TransitionOutcome, User, UserId, UserPatch,
};

/// Durable user and deal records.
///
/// Every method is atomic at single-row granularity.
/// [`apply_transition`](DealStore::apply_transition) is the unit of work for
/// multi-row lifecycle writes: it reads the deal, checks the transition's
/// guard, and writes the deal (plus the seller's counter on completion)
/// inside one transaction.
#[async_trait]
pub trait DealStore: StorageAdapter {
    /// Inserts the user if absent, then applies the non-`None` patch fields.
    async fn upsert_user(&self, id: UserId, patch: UserPatch) -> Result<(), GuarantorError>;

    async fn get_user(&self, id: UserId) -> Result<Option<User>, GuarantorError>;

    async fn insert_deal(&self, deal: &Deal) -> Result<(), GuarantorError>;

    async fn get_deal(&self, id: &DealId) -> Result<Option<Deal>, GuarantorError>;

    /// Applies the non-`None` patch fields. Returns `false` if no row matched.
    async fn update_deal_fields(&self, id: &DealId, patch: DealPatch)
    -> Result<bool, GuarantorError>;

    /// Returns `false` if no row matched.
    async fn delete_deal(&self, id: &DealId) -> Result<bool, GuarantorError>;

    /// Adds one to the user's successful-deal counter, creating the user if needed.
    async fn increment_successful_deals(&self, id: UserId) -> Result<(), GuarantorError>;

    /// Executes a guarded lifecycle write as a single transaction.
    async fn apply_transition(
        &self,
        id: &DealId,
        transition: DealTransition,
    ) -> Result<TransitionOutcome, GuarantorError>;
}
