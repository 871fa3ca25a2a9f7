// SPDX-FileCopyrightText: 2026 Guarantor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Keyed async locks serializing engine operations per deal id.

use std::sync::Arc;

use dashmap::DashMap;
use guarantor_core::DealId;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Registry of per-deal mutexes.
///
/// Operations on the same deal id queue behind each other; different ids
/// never contend. An entry is evicted when its last holder releases it, so
/// the registry only holds ids with in-flight operations.
#[derive(Debug, Clone, Default)]
pub struct DealLocks {
    inner: Arc<DashMap<DealId, Arc<Mutex<()>>>>,
}

impl DealLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to `id`.
    pub async fn acquire(&self, id: &DealId) -> DealLockGuard {
        let lock = self.inner.entry(id.clone()).or_default().clone();
        let guard = lock.lock_owned().await;
        DealLockGuard {
            registry: Arc::clone(&self.inner),
            id: id.clone(),
            guard: Some(guard),
        }
    }

    /// Number of ids currently locked or awaited.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

/// Exclusive access to one deal id. Released on drop.
#[derive(Debug)]
pub struct DealLockGuard {
    registry: Arc<DashMap<DealId, Arc<Mutex<()>>>>,
    id: DealId,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for DealLockGuard {
    fn drop(&mut self) {
        // Release first so the registry's Arc is the only one left when idle.
        drop(self.guard.take());
        self.registry
            .remove_if(&self.id, |_, lock| Arc::strong_count(lock) == 1);
    }
}
