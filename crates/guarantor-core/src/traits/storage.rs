// SPDX-FileCopyrightText: 2026 Guarantor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage adapter lifecycle trait.

use async_trait::async_trait;

use crate::error::GuarantorError;
use crate::traits::adapter::PluginAdapter;

/// Lifecycle of a persistence backend.
#[async_trait]
pub trait StorageAdapter: PluginAdapter {
    /// Opens the backend and applies pending migrations.
    async fn initialize(&self) -> Result<(), GuarantorError>;

    /// Flushes pending writes and releases the connection.
    async fn close(&self) -> Result<(), GuarantorError>;
}
