// SPDX-FileCopyrightText: 2026 Guarantor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ephemeral conversation state storage.

use crate::conversation::Conversation;
use crate::types::UserId;

/// Process-lifetime map from user identity to conversation state.
///
/// Implementations must make [`compare_and_swap`](SessionStore::compare_and_swap)
/// atomic per user so that concurrent events for one user never lose an
/// update. Operations for different users must not contend.
pub trait SessionStore: Send + Sync + 'static {
    /// Current state; `Idle` for users never seen.
    fn load(&self, user: UserId) -> Conversation;

    /// Replaces the state with `next` only if it still equals `expected`.
    ///
    /// Returns `false` when another event changed the state first; the
    /// caller should reload and re-evaluate.
    fn compare_and_swap(&self, user: UserId, expected: &Conversation, next: Conversation) -> bool;

    /// Unconditionally returns the user to `Idle`.
    fn reset(&self, user: UserId);

    /// Number of users with a non-idle conversation.
    fn active_count(&self) -> usize;
}
