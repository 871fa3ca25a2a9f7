// SPDX-FileCopyrightText: 2026 Guarantor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deal lifecycle engine and conversation controller.
//!
//! - [`DealEngine`] owns deal creation, claim arbitration and status
//!   transitions, serialized per deal id by [`DealLocks`].
//! - [`SessionController`] drives each user's conversation over a
//!   [`SessionStore`](guarantor_core::SessionStore).
//! - [`Dispatcher`] routes inbound events to both and posts the resulting
//!   notices to the [`Outbox`].

pub mod deal;
pub mod dispatch;
pub mod link;
pub mod locks;
pub mod outbox;
pub mod session;
pub mod session_store;
pub mod shutdown;
pub mod validate;

pub use deal::{Claim, Completion, DealEngine, DealSettings};
pub use dispatch::{DispatchSettings, Dispatcher, rejection_for};
pub use locks::DealLocks;
pub use outbox::Outbox;
pub use session::{SessionController, TextOutcome};
pub use session_store::MemorySessionStore;
