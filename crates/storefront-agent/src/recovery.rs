// SPDX-FileCopyrightText: 2026 Storefront Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Abandoned-order recovery worker.
//!
//! Every tick re-derives eligibility from persisted state: pending orders
//! older than the threshold, with no successful reminder and no inbound
//! message since they were created. Orders are reminded one at a time and
//! each outcome is appended to the event log. A failure on one order is
//! logged and the batch continues.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde_json::json;
use storefront_config::model::{MAX_RECOVERY_MINUTES, MAX_TICK_INTERVAL_SECS, RecoveryConfig};
use storefront_core::types::{
    EventType, NewEvent, OutboundPayload, RecoveryCandidate, UNKNOWN_CUSTOMER_NAME,
};
use storefront_core::{StorageAdapter, StorefrontError};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::dispatch::{DispatchClient, DispatchOutcome};

/// Template parameter used when the customer's name is unknown.
pub const DEFAULT_CUSTOMER_NAME: &str = "Valued Customer";

/// Template parameter used when the order has no line items.
pub const DEFAULT_FIRST_ITEM: &str = "your cart items";

/// A configured minute count as a duration, capped at [`MAX_RECOVERY_MINUTES`].
pub fn recovery_window(minutes: u64) -> chrono::Duration {
    let capped = minutes.min(MAX_RECOVERY_MINUTES);
    i64::try_from(capped)
        .ok()
        .and_then(chrono::Duration::try_minutes)
        .unwrap_or_else(|| chrono::Duration::days(365))
}

/// What happened to one order during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderOutcome {
    Sent,
    Failed,
    /// Already reminded, or its state could not be checked.
    Skipped,
}

/// Counts for one tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    pub eligible: usize,
    pub sent: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// Periodic reminder sender for stalled orders.
pub struct RecoveryWorker {
    storage: Arc<dyn StorageAdapter>,
    dispatch: Arc<DispatchClient>,
    config: RecoveryConfig,
}

impl RecoveryWorker {
    pub fn new(
        storage: Arc<dyn StorageAdapter>,
        dispatch: Arc<DispatchClient>,
        config: RecoveryConfig,
    ) -> Self {
        Self {
            storage,
            dispatch,
            config,
        }
    }

    /// Minimum order age before a reminder is due.
    pub fn threshold(&self) -> chrono::Duration {
        recovery_window(self.config.abandoned_threshold_minutes)
    }

    /// The recovery template for one order.
    pub fn reminder_payload(&self, candidate: &RecoveryCandidate) -> OutboundPayload {
        let name = candidate
            .customer_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty() && *n != UNKNOWN_CUSTOMER_NAME)
            .unwrap_or(DEFAULT_CUSTOMER_NAME);
        let item = candidate
            .first_item
            .as_deref()
            .filter(|i| !i.trim().is_empty())
            .unwrap_or(DEFAULT_FIRST_ITEM);
        OutboundPayload::Template {
            name: self.config.template_name.clone(),
            language: self.config.template_language.clone(),
            parameters: vec![name.to_string(), item.to_string()],
        }
    }

    /// Run one scheduler pass as of `now`.
    ///
    /// Returns an error only when selection itself fails, in which case
    /// nothing was written.
    pub async fn run_tick(&self, now: DateTime<Utc>) -> Result<TickReport, StorefrontError> {
        let cutoff = now - self.threshold();
        let candidates = self.storage.recovery_candidates(cutoff).await?;

        let mut report = TickReport {
            eligible: candidates.len(),
            ..TickReport::default()
        };
        if candidates.is_empty() {
            debug!("no orders to recover");
            return Ok(report);
        }
        info!(count = candidates.len(), "found orders to recover");

        for candidate in &candidates {
            match self.remind(candidate, now).await {
                ReminderOutcome::Sent => report.sent += 1,
                ReminderOutcome::Failed => report.failed += 1,
                ReminderOutcome::Skipped => report.skipped += 1,
            }
        }
        Ok(report)
    }

    /// Remind one order unless a reminder was already recorded for it.
    pub async fn remind(&self, candidate: &RecoveryCandidate, now: DateTime<Utc>) -> ReminderOutcome {
        match self.storage.has_reminder_sent(candidate.order_id).await {
            Ok(true) => {
                debug!(order_id = candidate.order_id, "already reminded, skipping");
                return ReminderOutcome::Skipped;
            }
            Ok(false) => {}
            Err(e) => {
                warn!(order_id = candidate.order_id, error = %e, "could not check reminder state, skipping");
                return ReminderOutcome::Skipped;
            }
        }
        self.send_reminder(candidate, now).await
    }

    /// Dispatch the reminder and log the outcome without checking history.
    pub async fn send_reminder(
        &self,
        candidate: &RecoveryCandidate,
        now: DateTime<Utc>,
    ) -> ReminderOutcome {
        let payload = self.reminder_payload(candidate);
        let outcome = self.dispatch.send(&candidate.phone, &payload).await;
        self.log_outcome(candidate, &outcome, now).await;

        if outcome.delivered {
            info!(order_id = candidate.order_id, phone = %candidate.phone, "recovery reminder sent");
            ReminderOutcome::Sent
        } else {
            error!(
                order_id = candidate.order_id,
                phone = %candidate.phone,
                attempts = outcome.attempts,
                "recovery reminder failed"
            );
            ReminderOutcome::Failed
        }
    }

    async fn log_outcome(
        &self,
        candidate: &RecoveryCandidate,
        outcome: &DispatchOutcome,
        now: DateTime<Utc>,
    ) {
        let (event_type, metadata) = if outcome.delivered {
            (
                EventType::ReminderSent,
                json!({ "order_id": candidate.order_id, "status": "success" }),
            )
        } else {
            (
                EventType::ReminderFailed,
                json!({
                    "order_id": candidate.order_id,
                    "status": "failed",
                    "reason": "max_retries_reached",
                    "attempts": outcome.attempts,
                }),
            )
        };
        let event = NewEvent {
            customer_id: candidate.customer_id,
            order_id: candidate.order_id,
            event_type,
            metadata,
            created_at: now,
        };
        match self.storage.record_event(&event).await {
            Ok(Some(id)) => debug!(event_id = id, order_id = candidate.order_id, %event_type, "event logged"),
            Ok(None) => warn!(order_id = candidate.order_id, "reminder already logged by another worker"),
            Err(e) => error!(order_id = candidate.order_id, %event_type, error = %e, "failed to log event"),
        }
    }

    /// Run ticks on the configured interval until `token` is cancelled.
    ///
    /// The first tick fires immediately. Ticks that fall behind are skipped
    /// rather than bunched up.
    pub fn spawn(self: Arc<Self>, token: CancellationToken) -> JoinHandle<()> {
        let period = Duration::from_secs(
            self.config
                .tick_interval_secs
                .clamp(1, MAX_TICK_INTERVAL_SECS),
        );
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            info!(
                interval_secs = period.as_secs(),
                threshold_minutes = self.config.abandoned_threshold_minutes,
                "recovery worker started"
            );

            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => {
                        info!("recovery worker shutting down");
                        break;
                    }
                    _ = interval.tick() => {
                        match self.run_tick(Utc::now()).await {
                            Ok(report) if report.eligible > 0 => {
                                info!(
                                    sent = report.sent,
                                    failed = report.failed,
                                    skipped = report.skipped,
                                    "recovery tick complete"
                                );
                            }
                            Ok(_) => {}
                            Err(e) => error!(error = %e, "recovery tick failed"),
                        }
                    }
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use storefront_core::types::Direction;
    use storefront_test_utils::TestHarness;

    use super::*;
    use crate::dispatch::RetryPolicy;

    fn worker(harness: &TestHarness) -> RecoveryWorker {
        let dispatch = DispatchClient::new(
            harness.transport.clone(),
            RetryPolicy::from(&harness.config.dispatch),
        );
        RecoveryWorker::new(
            harness.storage.clone(),
            Arc::new(dispatch),
            harness.config.recovery.clone(),
        )
    }

    fn minutes_ago(now: DateTime<Utc>, minutes: i64) -> DateTime<Utc> {
        now - chrono::Duration::minutes(minutes)
    }

    #[tokio::test]
    async fn stale_order_is_reminded_once() {
        let harness = TestHarness::new().await.unwrap();
        let now = Utc::now();
        let order = harness
            .place_order("919800000101", Some("Asha"), "Veg Burger", 1, minutes_ago(now, 20))
            .await
            .unwrap();
        let worker = worker(&harness);

        let first = worker.run_tick(now).await.unwrap();
        assert_eq!(first, TickReport { eligible: 1, sent: 1, failed: 0, skipped: 0 });

        let second = worker.run_tick(now + chrono::Duration::minutes(1)).await.unwrap();
        assert_eq!(second.eligible, 0);
        assert_eq!(harness.transport.attempt_count().await, 1);

        let events = harness.storage.events_for_order(order.id).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, EventType::ReminderSent);
        assert_eq!(events[0].metadata["status"], "success");
    }

    #[tokio::test]
    async fn template_uses_customer_and_first_item() {
        let harness = TestHarness::new().await.unwrap();
        let now = Utc::now();
        harness
            .place_order("919800000102", Some("Ravi"), "Chicken Pizza", 2, minutes_ago(now, 30))
            .await
            .unwrap();
        worker(&harness).run_tick(now).await.unwrap();

        let delivered = harness.transport.delivered().await;
        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].0, "919800000102");
        assert_eq!(
            delivered[0].1,
            OutboundPayload::Template {
                name: "abandoned_cart".into(),
                language: "en_US".into(),
                parameters: vec!["Ravi".into(), "Chicken Pizza".into()],
            }
        );
    }

    #[tokio::test]
    async fn unknown_name_falls_back_to_valued_customer() {
        let harness = TestHarness::new().await.unwrap();
        let worker = worker(&harness);
        let payload = worker.reminder_payload(&RecoveryCandidate {
            order_id: 1,
            customer_id: 1,
            phone: "1".into(),
            customer_name: Some(UNKNOWN_CUSTOMER_NAME.into()),
            first_item: None,
            created_at: Utc::now(),
        });
        let OutboundPayload::Template { parameters, .. } = payload else {
            panic!("expected template");
        };
        assert_eq!(parameters, vec![DEFAULT_CUSTOMER_NAME, DEFAULT_FIRST_ITEM]);
    }

    #[test]
    fn recovery_window_is_capped_and_never_negative() {
        assert_eq!(recovery_window(15), chrono::Duration::minutes(15));
        assert_eq!(recovery_window(u64::MAX), chrono::Duration::days(365));
        assert_eq!(recovery_window(1 << 50), chrono::Duration::days(365));
    }

    #[tokio::test]
    async fn oversized_threshold_never_reminds_fresh_orders() {
        let harness = TestHarness::builder()
            .with_config(|c| c.recovery.abandoned_threshold_minutes = u64::MAX)
            .build()
            .await
            .unwrap();
        let now = Utc::now();
        harness
            .place_order("919800000109", None, "Veg Burger", 1, now)
            .await
            .unwrap();

        let worker = worker(&harness);
        assert!(worker.threshold() > chrono::Duration::zero());
        let report = worker.run_tick(now).await.unwrap();
        assert_eq!(report.eligible, 0);
        assert_eq!(harness.transport.attempt_count().await, 0);
    }

    #[tokio::test]
    async fn young_orders_wait_for_threshold() {
        let harness = TestHarness::new().await.unwrap();
        let now = Utc::now();
        harness
            .place_order("919800000103", None, "Veg Burger", 1, minutes_ago(now, 10))
            .await
            .unwrap();
        let report = worker(&harness).run_tick(now).await.unwrap();
        assert_eq!(report.eligible, 0);
        assert_eq!(harness.transport.attempt_count().await, 0);
    }

    #[tokio::test]
    async fn customer_reply_suppresses_reminder_permanently() {
        let harness = TestHarness::new().await.unwrap();
        let now = Utc::now();
        let order = harness
            .place_order("919800000104", None, "Veg Burger", 1, minutes_ago(now, 40))
            .await
            .unwrap();
        harness
            .storage
            .insert_message(order.customer_id, Direction::In, "still deciding", minutes_ago(now, 35))
            .await
            .unwrap();

        let worker = worker(&harness);
        for later in [0, 60, 600] {
            let report = worker
                .run_tick(now + chrono::Duration::minutes(later))
                .await
                .unwrap();
            assert_eq!(report.eligible, 0);
        }
        assert_eq!(harness.transport.attempt_count().await, 0);
    }

    #[tokio::test]
    async fn exhausted_retries_log_failure_and_retry_next_tick() {
        let harness = TestHarness::builder()
            .with_broken_transport()
            .build()
            .await
            .unwrap();
        let now = Utc::now();
        let order = harness
            .place_order("919800000105", None, "Masala Fries", 1, minutes_ago(now, 20))
            .await
            .unwrap();
        let worker = worker(&harness);

        let report = worker.run_tick(now).await.unwrap();
        assert_eq!(report.failed, 1);
        assert_eq!(harness.transport.attempt_count().await, 3);

        let events = harness.storage.events_for_order(order.id).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, EventType::ReminderFailed);
        assert_eq!(events[0].metadata["reason"], "max_retries_reached");
        assert_eq!(events[0].metadata["attempts"], 3);

        // Still eligible: only a successful reminder closes the order out.
        let again = worker.run_tick(now + chrono::Duration::minutes(1)).await.unwrap();
        assert_eq!(again.eligible, 1);
        assert_eq!(harness.transport.attempt_count().await, 6);
    }

    #[tokio::test]
    async fn one_failing_order_does_not_stop_the_batch() {
        // First three attempts fail: the oldest order exhausts its retries,
        // the next one goes through.
        let harness = TestHarness::builder()
            .with_failing_transport(3)
            .build()
            .await
            .unwrap();
        let now = Utc::now();
        let first = harness
            .place_order("919800000106", None, "Veg Burger", 1, minutes_ago(now, 50))
            .await
            .unwrap();
        let second = harness
            .place_order("919800000107", None, "Veg Burger", 1, minutes_ago(now, 40))
            .await
            .unwrap();

        let report = worker(&harness).run_tick(now).await.unwrap();
        assert_eq!(report, TickReport { eligible: 2, sent: 1, failed: 1, skipped: 0 });
        assert!(!harness.storage.has_reminder_sent(first.id).await.unwrap());
        assert!(harness.storage.has_reminder_sent(second.id).await.unwrap());
    }

    #[tokio::test]
    async fn spawned_worker_ticks_until_cancelled() {
        let harness = TestHarness::builder()
            .with_config(|c| c.recovery.tick_interval_secs = 1)
            .build()
            .await
            .unwrap();
        harness
            .place_order("919800000108", None, "Veg Burger", 1, minutes_ago(Utc::now(), 20))
            .await
            .unwrap();

        let token = CancellationToken::new();
        let handle = Arc::new(worker(&harness)).spawn(token.clone());

        for _ in 0..100 {
            if harness.transport.attempt_count().await > 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        token.cancel();
        handle.await.unwrap();

        assert_eq!(harness.transport.delivered().await.len(), 1);
    }
}
