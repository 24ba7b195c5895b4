// SPDX-FileCopyrightText: 2026 Storefront Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock messaging transport for deterministic testing.
//!
//! `MockTransport` implements `MessagingTransport`, records every send
//! attempt, and fails a scripted number of times before succeeding.

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::Instant;

use storefront_core::StorefrontError;
use storefront_core::traits::{MessagingTransport, PluginAdapter};
use storefront_core::types::{AdapterType, HealthStatus, OutboundPayload};

/// One call to [`MockTransport::send`].
#[derive(Debug, Clone)]
pub struct SendAttempt {
    pub recipient: String,
    pub payload: OutboundPayload,
    pub succeeded: bool,
    /// Tokio clock reading, so paused-time tests can measure retry gaps.
    pub at: Instant,
}

#[derive(Debug)]
enum Script {
    FailFirst(u32),
    AlwaysFail,
}

/// A mock messaging transport for testing.
pub struct MockTransport {
    script: Mutex<Script>,
    attempts: Mutex<Vec<SendAttempt>>,
}

impl MockTransport {
    /// A transport whose sends always succeed.
    pub fn new() -> Self {
        Self::failing(0)
    }

    /// A transport that fails the first `failures` sends, then succeeds.
    pub fn failing(failures: u32) -> Self {
        Self {
            script: Mutex::new(Script::FailFirst(failures)),
            attempts: Mutex::new(Vec::new()),
        }
    }

    /// A transport whose sends never succeed.
    pub fn always_failing() -> Self {
        Self {
            script: Mutex::new(Script::AlwaysFail),
            attempts: Mutex::new(Vec::new()),
        }
    }

    /// Every attempt made so far, in order.
    pub async fn attempts(&self) -> Vec<SendAttempt> {
        self.attempts.lock().await.clone()
    }

    pub async fn attempt_count(&self) -> usize {
        self.attempts.lock().await.len()
    }

    /// Payloads of the attempts that succeeded.
    pub async fn delivered(&self) -> Vec<(String, OutboundPayload)> {
        self.attempts
            .lock()
            .await
            .iter()
            .filter(|a| a.succeeded)
            .map(|a| (a.recipient.clone(), a.payload.clone()))
            .collect()
    }

    /// Bodies of successfully delivered text messages.
    pub async fn delivered_texts(&self) -> Vec<String> {
        self.delivered()
            .await
            .into_iter()
            .filter_map(|(_, payload)| match payload {
                OutboundPayload::Text(body) => Some(body),
                OutboundPayload::Template { .. } => None,
            })
            .collect()
    }

    pub async fn clear(&self) {
        self.attempts.lock().await.clear();
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockTransport {
    fn name(&self) -> &str {
        "mock-transport"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Transport
    }

    async fn health_check(&self) -> Result<HealthStatus, StorefrontError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), StorefrontError> {
        Ok(())
    }
}

#[async_trait]
impl MessagingTransport for MockTransport {
    async fn send(
        &self,
        recipient: &str,
        payload: &OutboundPayload,
    ) -> Result<(), StorefrontError> {
        let succeeded = {
            let mut script = self.script.lock().await;
            match &mut *script {
                Script::AlwaysFail => false,
                Script::FailFirst(0) => true,
                Script::FailFirst(n) => {
                    *n -= 1;
                    false
                }
            }
        };

        self.attempts.lock().await.push(SendAttempt {
            recipient: recipient.to_string(),
            payload: payload.clone(),
            succeeded,
            at: Instant::now(),
        });

        if succeeded {
            Ok(())
        } else {
            Err(StorefrontError::transport("scripted mock failure"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(body: &str) -> OutboundPayload {
        OutboundPayload::Text(body.to_string())
    }

    #[tokio::test]
    async fn default_transport_always_delivers() {
        let transport = MockTransport::new();
        transport.send("1", &text("a")).await.unwrap();
        transport.send("2", &text("b")).await.unwrap();
        assert_eq!(transport.delivered_texts().await, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn scripted_failures_precede_success() {
        let transport = MockTransport::failing(2);
        assert!(transport.send("1", &text("x")).await.is_err());
        assert!(transport.send("1", &text("x")).await.is_err());
        assert!(transport.send("1", &text("x")).await.is_ok());

        let attempts = transport.attempts().await;
        assert_eq!(attempts.len(), 3);
        assert_eq!(
            attempts.iter().map(|a| a.succeeded).collect::<Vec<_>>(),
            vec![false, false, true]
        );
    }

    #[tokio::test]
    async fn always_failing_never_delivers() {
        let transport = MockTransport::always_failing();
        for _ in 0..5 {
            assert!(transport.send("1", &text("x")).await.is_err());
        }
        assert_eq!(transport.attempt_count().await, 5);
        assert!(transport.delivered().await.is_empty());
    }
}
