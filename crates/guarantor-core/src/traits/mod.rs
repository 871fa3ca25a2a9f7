// SPDX-FileCopyrightText: 2026 Guarantor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait seams between the engine and its collaborators.
//!
//! Adapters extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod channel;
pub mod session;
pub mod storage;
pub mod store;

pub use adapter::PluginAdapter;
pub use channel::{ChannelAdapter, NotificationGateway};
pub use session::SessionStore;
pub use storage::StorageAdapter;
pub use store::DealStore;
