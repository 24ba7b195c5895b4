// SPDX-FileCopyrightText: 2026 Storefront Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Operator-triggered actions: status changes, manual abandonment,
//! synthetic orders, and immediate reminders and summaries.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use storefront_config::model::RecoveryConfig;
use storefront_core::types::{
    CustomerId, DailyStats, Direction, LineItem, NewOrder, Order, OrderId, OrderStatus,
    OutboundPayload,
};
use storefront_core::{StorageAdapter, StorefrontError};
use tracing::{error, info, warn};

use crate::dispatch::{DispatchClient, DispatchOutcome};
use crate::menu::format_price;
use crate::recovery::{RecoveryWorker, ReminderOutcome, recovery_window};

/// Line item used for synthetic abandoned orders.
pub const SIMULATED_ITEM_NAME: &str = "Premium Plan";

pub const ORDER_READY_NOTICE: &str =
    "✅ *Order Update:* Your order is ready! Please pick it up at the counter.";

pub const ORDER_CANCELLED_NOTICE: &str =
    "❌ *Order Update:* Sorry, we cannot fulfill your order at this time.";

/// Customer-facing notice for a status an order just moved into.
pub fn status_notice(status: OrderStatus) -> Option<&'static str> {
    match status {
        OrderStatus::Completed => Some(ORDER_READY_NOTICE),
        OrderStatus::Abandoned => Some(ORDER_CANCELLED_NOTICE),
        OrderStatus::Pending => None,
    }
}

/// Render the store summary sent by [`AdminActions::send_summary_now`].
pub fn format_summary(stats: &DailyStats, currency: &str) -> String {
    format!(
        "📊 *Daily Store Summary*\n\n✅ Revenue: {}\n📦 Orders: {}\n⚠️ Abandoned: {} ({})\n🔁 Recovered: {}",
        format_price(currency, stats.total_revenue),
        stats.new_orders,
        stats.abandoned_count,
        format_price(currency, stats.lost_revenue),
        stats.recovered_count,
    )
}

fn start_of_day(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive()
        .and_hms_opt(0, 0, 0)
        .map_or(now, |midnight| midnight.and_utc())
}

pub struct AdminActions {
    storage: Arc<dyn StorageAdapter>,
    dispatch: Arc<DispatchClient>,
    recovery: Arc<RecoveryWorker>,
    recovery_config: RecoveryConfig,
    currency_symbol: String,
}

impl AdminActions {
    pub fn new(
        storage: Arc<dyn StorageAdapter>,
        dispatch: Arc<DispatchClient>,
        recovery: Arc<RecoveryWorker>,
        recovery_config: RecoveryConfig,
        currency_symbol: impl Into<String>,
    ) -> Self {
        Self {
            storage,
            dispatch,
            recovery,
            recovery_config,
            currency_symbol: currency_symbol.into(),
        }
    }

    /// Force a non-completed order to `abandoned`.
    ///
    /// Returns `false` when the order is missing, already completed, or the
    /// write failed. Nothing is sent to the customer.
    pub async fn manual_abandon(&self, order_id: OrderId) -> bool {
        match self.storage.manual_abandon(order_id, Utc::now()).await {
            Ok(true) => {
                info!(order_id, "order manually abandoned");
                true
            }
            Ok(false) => {
                warn!(order_id, "order not abandoned: missing or completed");
                false
            }
            Err(e) => {
                error!(order_id, error = %e, "manual abandon failed");
                false
            }
        }
    }

    /// Move an order to `to` and tell the customer when its state changed.
    ///
    /// The notification is best effort; its failure does not undo the
    /// transition.
    pub async fn transition_order(
        &self,
        order_id: OrderId,
        to: OrderStatus,
    ) -> Result<Order, StorefrontError> {
        let before = self
            .storage
            .get_order(order_id)
            .await?
            .ok_or_else(|| StorefrontError::NotFound {
                entity: "order",
                id: order_id.to_string(),
            })?;
        let order = self.storage.transition_order(order_id, to, Utc::now()).await?;
        if before.status == order.status {
            return Ok(order);
        }
        info!(order_id, from = %before.status, to = %order.status, "order status changed");

        if let Some(notice) = status_notice(order.status) {
            match self.storage.get_customer(order.customer_id).await {
                Ok(Some(customer)) => {
                    self.notify(customer.id, &customer.phone, notice).await;
                }
                Ok(None) => warn!(order_id, "order has no customer to notify"),
                Err(e) => warn!(order_id, error = %e, "could not load customer to notify"),
            }
        }
        Ok(order)
    }

    /// Create a backdated pending order so the next tick picks it up.
    pub async fn simulate_abandoned_order(
        &self,
        customer_id: CustomerId,
        amount: Decimal,
    ) -> Result<Order, StorefrontError> {
        if self.storage.get_customer(customer_id).await?.is_none() {
            return Err(StorefrontError::NotFound {
                entity: "customer",
                id: customer_id.to_string(),
            });
        }
        let backdate = recovery_window(self.recovery_config.simulated_backdate_minutes);
        let order = self
            .storage
            .create_order(&NewOrder {
                customer_id,
                items: vec![LineItem {
                    name: SIMULATED_ITEM_NAME.to_string(),
                    unit_price: amount,
                    quantity: 1,
                }],
                created_at: Utc::now() - backdate,
            })
            .await?;
        info!(order_id = order.id, customer_id, %amount, "simulated abandoned order");
        Ok(order)
    }

    /// Send the recovery template for one order right away, ignoring the
    /// age threshold and any previous reminder.
    pub async fn send_recovery_now(&self, order_id: OrderId) -> Result<bool, StorefrontError> {
        let candidate = self
            .storage
            .recovery_candidate(order_id)
            .await?
            .ok_or_else(|| StorefrontError::NotFound {
                entity: "order",
                id: order_id.to_string(),
            })?;
        let outcome = self.recovery.send_reminder(&candidate, Utc::now()).await;
        Ok(outcome == ReminderOutcome::Sent)
    }

    /// Compute today's figures and text them to `phone`.
    pub async fn send_summary_now(&self, phone: &str) -> Result<DispatchOutcome, StorefrontError> {
        let stats = self.storage.daily_stats(start_of_day(Utc::now())).await?;
        let text = format_summary(&stats, &self.currency_symbol);
        let outcome = self.dispatch.send(phone, &OutboundPayload::Text(text)).await;
        if outcome.delivered {
            info!(phone, new_orders = stats.new_orders, "daily summary sent");
        } else {
            error!(phone, attempts = outcome.attempts, "daily summary not delivered");
        }
        Ok(outcome)
    }

    /// Text a known customer and keep the message in their history once
    /// delivered.
    pub async fn message_customer(
        &self,
        customer_id: CustomerId,
        text: &str,
    ) -> Result<DispatchOutcome, StorefrontError> {
        let customer = self
            .storage
            .get_customer(customer_id)
            .await?
            .ok_or_else(|| StorefrontError::NotFound {
                entity: "customer",
                id: customer_id.to_string(),
            })?;
        let outcome = self
            .dispatch
            .send(&customer.phone, &OutboundPayload::Text(text.to_string()))
            .await;
        if outcome.delivered {
            self.storage
                .insert_message(customer.id, Direction::Out, text, Utc::now())
                .await?;
        }
        Ok(outcome)
    }

    async fn notify(&self, customer_id: CustomerId, phone: &str, text: &str) {
        let outcome = self
            .dispatch
            .send(phone, &OutboundPayload::Text(text.to_string()))
            .await;
        if !outcome.delivered {
            warn!(phone, attempts = outcome.attempts, "status notification not delivered");
            return;
        }
        if let Err(e) = self
            .storage
            .insert_message(customer_id, Direction::Out, text, Utc::now())
            .await
        {
            warn!(phone, error = %e, "failed to record status notification");
        }
    }
}
