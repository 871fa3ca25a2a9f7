// SPDX-FileCopyrightText: 2026 Guarantor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Channel adapter traits for messaging platform integrations.

use async_trait::async_trait;

use crate::error::GuarantorError;
use crate::event::{Delivery, InboundEvent};
use crate::traits::adapter::PluginAdapter;

/// Source of inbound user events.
#[async_trait]
pub trait ChannelAdapter: PluginAdapter {
    /// Establishes a connection to the messaging platform.
    async fn connect(&mut self) -> Result<(), GuarantorError>;

    /// Receives the next inbound event from the channel.
    async fn receive(&self) -> Result<InboundEvent, GuarantorError>;
}

/// Outbound delivery of rendered notices.
///
/// Delivery is best effort: callers log failures and never roll back the
/// state change that produced the notice.
#[async_trait]
pub trait NotificationGateway: Send + Sync + 'static {
    async fn notify(&self, delivery: Delivery) -> Result<(), GuarantorError>;
}
