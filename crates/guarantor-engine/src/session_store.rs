// SPDX-FileCopyrightText: 2026 Guarantor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory conversation state, lost on restart.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use guarantor_core::{Conversation, SessionStore, UserId};

/// Sharded map of non-idle conversations. Idle users have no entry.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    states: DashMap<UserId, Conversation>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self, user: UserId) -> Conversation {
        self.states
            .get(&user)
            .map(|state| *state)
            .unwrap_or_default()
    }

    fn compare_and_swap(&self, user: UserId, expected: &Conversation, next: Conversation) -> bool {
        match self.states.entry(user) {
            Entry::Occupied(mut entry) => {
                if entry.get() != expected {
                    return false;
                }
                if next.is_idle() {
                    entry.remove();
                } else {
                    entry.insert(next);
                }
                true
            }
            Entry::Vacant(entry) => {
                if !expected.is_idle() {
                    return false;
                }
                if !next.is_idle() {
                    entry.insert(next);
                }
                true
            }
        }
    }

    fn reset(&self, user: UserId) {
        self.states.remove(&user);
    }

    fn active_count(&self) -> usize {
        self.states.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use guarantor_core::PaymentRail;

    #[test]
    fn unknown_user_is_idle() {
        let store = MemorySessionStore::new();
        assert_eq!(store.load(UserId(1)), Conversation::Idle);
        assert_eq!(store.active_count(), 0);
    }

    #[test]
    fn swap_succeeds_only_from_expected_state() {
        let store = MemorySessionStore::new();
        let user = UserId(1);
        assert!(store.compare_and_swap(user, &Conversation::Idle, Conversation::AwaitingPayMethod));
        assert!(!store.compare_and_swap(user, &Conversation::Idle, Conversation::AwaitingWallet));
        assert_eq!(store.load(user), Conversation::AwaitingPayMethod);

        let next = Conversation::AwaitingAmount {
            rail: PaymentRail::Card,
        };
        assert!(store.compare_and_swap(user, &Conversation::AwaitingPayMethod, next));
        assert_eq!(store.load(user), next);
    }

    #[test]
    fn idle_is_stored_as_absence() {
        let store = MemorySessionStore::new();
        let user = UserId(2);
        store.compare_and_swap(user, &Conversation::Idle, Conversation::AwaitingCard);
        assert_eq!(store.active_count(), 1);
        assert!(store.compare_and_swap(user, &Conversation::AwaitingCard, Conversation::Idle));
        assert_eq!(store.active_count(), 0);
    }

    #[test]
    fn stale_expectation_on_missing_entry_fails() {
        let store = MemorySessionStore::new();
        assert!(!store.compare_and_swap(
            UserId(3),
            &Conversation::AwaitingWallet,
            Conversation::Idle
        ));
    }

    #[test]
    fn reset_returns_to_idle() {
        let store = MemorySessionStore::new();
        store.compare_and_swap(UserId(4), &Conversation::Idle, Conversation::AwaitingWallet);
        store.reset(UserId(4));
        assert!(store.load(UserId(4)).is_idle());
    }
}
