// SPDX-FileCopyrightText: 2026 Guarantor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock notification gateway that records every delivery.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use guarantor_core::{Delivery, GuarantorError, Notice, NotificationGateway, UserId};
use tokio::sync::{Mutex, Notify};

/// Captures deliveries for assertion in tests.
///
/// When set to fail, deliveries are still recorded but `notify` returns a
/// channel error, which lets tests check that delivery failures never
/// affect the state change that produced them.
#[derive(Default)]
pub struct MockGateway {
    sent: Mutex<Vec<Delivery>>,
    notify: Notify,
    failing: AtomicBool,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent deliveries fail.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// All deliveries recorded so far.
    pub async fn deliveries(&self) -> Vec<Delivery> {
        self.sent.lock().await.clone()
    }

    /// Notices delivered to `user`, in order.
    pub async fn notices_for(&self, user: UserId) -> Vec<Notice> {
        self.sent
            .lock()
            .await
            .iter()
            .filter(|d| d.user == user)
            .map(|d| d.notice.clone())
            .collect()
    }

    pub async fn clear(&self) {
        self.sent.lock().await.clear();
    }

    /// Waits until at least `count` deliveries were recorded.
    ///
    /// Returns `false` if `timeout` elapsed first.
    pub async fn wait_for(&self, count: usize, timeout: Duration) -> bool {
        tokio::time::timeout(timeout, async {
            loop {
                let notified = self.notify.notified();
                if self.sent.lock().await.len() >= count {
                    return;
                }
                notified.await;
            }
        })
        .await
        .is_ok()
    }
}

#[async_trait]
impl NotificationGateway for MockGateway {
    async fn notify(&self, delivery: Delivery) -> Result<(), GuarantorError> {
        self.sent.lock().await.push(delivery);
        self.notify.notify_waiters();
        if self.failing.load(Ordering::SeqCst) {
            return Err(GuarantorError::Channel {
                message: "mock delivery failure".into(),
                source: None,
            });
        }
        Ok(())
    }
}
