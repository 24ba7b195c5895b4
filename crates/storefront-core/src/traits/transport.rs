// SPDX-FileCopyrightText: 2026 Storefront Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound messaging transport trait (WhatsApp Cloud API, test doubles).

use async_trait::async_trait;

use crate::error::StorefrontError;
use crate::traits::adapter::PluginAdapter;
use crate::types::OutboundPayload;

/// A single-shot outbound messaging call.
///
/// Implementations perform exactly one request per call and never retry;
/// retry policy lives in the dispatch client above them. Timeouts, HTTP
/// errors, and malformed responses all surface as [`StorefrontError::Transport`].
#[async_trait]
pub trait MessagingTransport: PluginAdapter {
    /// Deliver `payload` to `recipient` (a phone identifier).
    async fn send(&self, recipient: &str, payload: &OutboundPayload)
        -> Result<(), StorefrontError>;
}
