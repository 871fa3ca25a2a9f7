// SPDX-FileCopyrightText: 2026 Guarantor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Guarantor integration tests.
//!
//! Provides mock adapters and test harness infrastructure for fast,
//! deterministic, CI-runnable tests without a Telegram connection.
//!
//! # Components
//!
//! - [`MockGateway`] - Notification gateway that captures deliveries
//! - [`MockChannel`] - Channel with injectable inbound events
//! - [`TestHarness`] - Full engine stack over a temp SQLite database

pub mod harness;
pub mod mock_channel;
pub mod mock_gateway;

pub use harness::TestHarness;
pub use mock_channel::MockChannel;
pub use mock_gateway::MockGateway;
