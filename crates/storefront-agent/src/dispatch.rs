// SPDX-FileCopyrightText: 2026 Storefront Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound dispatch with bounded, fixed-delay retry.
//!
//! [`DispatchClient`] wraps a [`MessagingTransport`] and never returns an
//! error: exhausting the attempt budget is reported through
//! [`DispatchOutcome`] so callers decide how to record it.

use std::sync::Arc;
use std::time::Duration;

use storefront_config::model::DispatchConfig;
use storefront_core::MessagingTransport;
use storefront_core::types::OutboundPayload;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// How many times to try and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl From<&DispatchConfig> for RetryPolicy {
    fn from(config: &DispatchConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            delay: Duration::from_millis(config.retry_delay_ms),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&DispatchConfig::default())
    }
}

/// Result of one dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub delivered: bool,
    /// Transport calls actually made.
    pub attempts: u32,
    /// Error text of the last failed attempt.
    pub last_error: Option<String>,
}

/// Sends through a transport, retrying failures up to the policy's limit.
pub struct DispatchClient {
    transport: Arc<dyn MessagingTransport>,
    policy: RetryPolicy,
    cancel: CancellationToken,
}

impl DispatchClient {
    pub fn new(transport: Arc<dyn MessagingTransport>, policy: RetryPolicy) -> Self {
        Self {
            transport,
            policy,
            cancel: CancellationToken::new(),
        }
    }

    /// Abort pending retries once `token` is cancelled. An attempt already
    /// in flight is allowed to finish.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    pub async fn send(&self, recipient: &str, payload: &OutboundPayload) -> DispatchOutcome {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut last_error = None;

        for attempt in 1..=max_attempts {
            if attempt > 1 {
                tokio::select! {
                    biased;
                    _ = self.cancel.cancelled() => {
                        warn!(recipient, attempts = attempt - 1, "dispatch cancelled between attempts");
                        return DispatchOutcome {
                            delivered: false,
                            attempts: attempt - 1,
                            last_error,
                        };
                    }
                    _ = tokio::time::sleep(self.policy.delay) => {}
                }
            }

            match self.transport.send(recipient, payload).await {
                Ok(()) => {
                    debug!(recipient, attempt, "dispatch delivered");
                    return DispatchOutcome {
                        delivered: true,
                        attempts: attempt,
                        last_error: None,
                    };
                }
                Err(e) => {
                    warn!(recipient, attempt, max_attempts, error = %e, "dispatch attempt failed");
                    last_error = Some(e.to_string());
                }
            }
        }

        DispatchOutcome {
            delivered: false,
            attempts: max_attempts,
            last_error,
        }
    }
}
