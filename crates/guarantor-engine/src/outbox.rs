// SPDX-FileCopyrightText: 2026 Guarantor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fire-and-forget notification delivery.

use std::sync::Arc;

use guarantor_core::{Delivery, NotificationGateway};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Sending half of the delivery queue.
///
/// Posting never blocks and never fails the caller. A background task feeds
/// the queue to the gateway; it exits once every `Outbox` clone is dropped
/// and the queue is empty.
#[derive(Debug, Clone)]
pub struct Outbox {
    tx: mpsc::UnboundedSender<Delivery>,
}

impl Outbox {
    /// Starts the delivery task. Await the handle after dropping all
    /// `Outbox` clones to flush pending notices.
    pub fn spawn(gateway: Arc<dyn NotificationGateway>) -> (Self, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::unbounded_channel::<Delivery>();
        let handle = tokio::spawn(async move {
            while let Some(delivery) = rx.recv().await {
                let user = delivery.user;
                if let Err(e) = gateway.notify(delivery).await {
                    warn!(user_id = %user, error = %e, "notification delivery failed");
                }
            }
            debug!("outbox drained");
        });
        (Self { tx }, handle)
    }

    pub fn post(&self, delivery: Delivery) {
        if let Err(mpsc::error::SendError(delivery)) = self.tx.send(delivery) {
            warn!(user_id = %delivery.user, "outbox closed, notice dropped");
        }
    }
}
