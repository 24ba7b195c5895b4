// SPDX-FileCopyrightText: 2026 Storefront Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turns one inbound customer message into a reply and, optionally, an order.
//!
//! The history is written in a fixed order: customer upsert, inbound
//! message, order (if any), outbound message, then dispatch. A failed
//! dispatch never rolls back what was already written.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use storefront_core::types::{
    CatalogItem, Customer, Direction, InboundMessage, LineItem, NewOrder, Order, OutboundPayload,
};
use storefront_core::{StorageAdapter, StorefrontError};
use tracing::{debug, error, info, warn};

use crate::dispatch::DispatchClient;
use crate::matcher::{extract_quantity, resolve_product};
use crate::menu::{EMPTY_MENU_REPLY, format_menu, format_price};

/// Whole-message keywords that get the menu instead of an order attempt.
pub const GREETING_KEYWORDS: &[&str] = &["menu", "hi", "hello"];

/// Reply when no catalog item matches.
pub const FALLBACK_REPLY: &str =
    "Sorry, I couldn't find that on our menu. Type \"menu\" to see what we have.";

/// Reply when an order was recognised but could not be saved.
pub const ORDER_FAILED_REPLY: &str =
    "Sorry, we couldn't place your order just now. Please try again in a moment.";

/// What handling one message produced.
#[derive(Debug, Clone)]
pub struct InterpretOutcome {
    pub customer: Customer,
    pub reply: String,
    pub order: Option<Order>,
    /// Whether the reply reached the transport.
    pub delivered: bool,
}

pub struct MessageInterpreter {
    storage: Arc<dyn StorageAdapter>,
    dispatch: Arc<DispatchClient>,
    currency_symbol: String,
}

impl MessageInterpreter {
    pub fn new(
        storage: Arc<dyn StorageAdapter>,
        dispatch: Arc<DispatchClient>,
        currency_symbol: impl Into<String>,
    ) -> Self {
        Self {
            storage,
            dispatch,
            currency_symbol: currency_symbol.into(),
        }
    }

    pub async fn handle_inbound(
        &self,
        inbound: &InboundMessage,
    ) -> Result<InterpretOutcome, StorefrontError> {
        self.handle_inbound_at(inbound, Utc::now()).await
    }

    /// Handle a message as if it arrived at `now`.
    ///
    /// Errors are returned only when the customer or the inbound message
    /// could not be recorded; everything after that degrades to a reply.
    pub async fn handle_inbound_at(
        &self,
        inbound: &InboundMessage,
        now: DateTime<Utc>,
    ) -> Result<InterpretOutcome, StorefrontError> {
        let customer = self
            .storage
            .upsert_customer(&inbound.sender, inbound.display_name.as_deref(), now)
            .await?;
        self.storage
            .insert_message(customer.id, Direction::In, &inbound.text, now)
            .await?;

        let normalized = inbound.text.trim().to_lowercase();
        let catalog = match self.storage.load_catalog().await {
            Ok(catalog) => catalog,
            Err(e) => {
                error!(phone = %customer.phone, error = %e, "failed to load catalog");
                Vec::new()
            }
        };

        let (reply, order) = if GREETING_KEYWORDS.contains(&normalized.as_str()) {
            debug!(phone = %customer.phone, "greeting, sending menu");
            (format_menu(&catalog, &self.currency_symbol), None)
        } else if catalog.is_empty() {
            (EMPTY_MENU_REPLY.to_string(), None)
        } else {
            self.try_order(&customer, &inbound.text, &catalog, now).await
        };

        if let Err(e) = self
            .storage
            .insert_message(customer.id, Direction::Out, &reply, now)
            .await
        {
            warn!(phone = %customer.phone, error = %e, "failed to record reply");
        }

        let outcome = self
            .dispatch
            .send(&customer.phone, &OutboundPayload::Text(reply.clone()))
            .await;
        if !outcome.delivered {
            warn!(
                phone = %customer.phone,
                attempts = outcome.attempts,
                "reply not delivered"
            );
        }

        Ok(InterpretOutcome {
            customer,
            reply,
            order,
            delivered: outcome.delivered,
        })
    }

    async fn try_order(
        &self,
        customer: &Customer,
        text: &str,
        catalog: &[CatalogItem],
        now: DateTime<Utc>,
    ) -> (String, Option<Order>) {
        let Some(found) = resolve_product(text, catalog) else {
            debug!(phone = %customer.phone, "no product matched");
            return (FALLBACK_REPLY.to_string(), None);
        };

        let quantity = extract_quantity(text);
        let new_order = NewOrder {
            customer_id: customer.id,
            items: vec![LineItem {
                name: found.item.name.clone(),
                unit_price: found.item.price,
                quantity,
            }],
            created_at: now,
        };

        match self.storage.create_order(&new_order).await {
            Ok(order) => {
                info!(
                    order_id = order.id,
                    phone = %customer.phone,
                    item = %found.item.name,
                    quantity,
                    score = found.score,
                    "order created"
                );
                (self.confirmation(&order, &found.item.name, quantity), Some(order))
            }
            Err(e) => {
                error!(phone = %customer.phone, error = %e, "failed to create order");
                (ORDER_FAILED_REPLY.to_string(), None)
            }
        }
    }

    fn confirmation(&self, order: &Order, item: &str, quantity: u32) -> String {
        format!(
            "✅ Order #{} placed: {} x {} = {}. We'll let you know when it's ready!",
            order.id,
            quantity,
            item,
            format_price(&self.currency_symbol, order.total)
        )
    }
}

#[cfg(test)]
mod tests {
    use storefront_test_utils::TestHarness;

    use super::*;
    use crate::dispatch::RetryPolicy;

    fn interpreter(harness: &TestHarness) -> MessageInterpreter {
        let dispatch = DispatchClient::new(
            harness.transport.clone(),
            RetryPolicy::from(&harness.config.dispatch),
        );
        MessageInterpreter::new(harness.storage.clone(), Arc::new(dispatch), "₹")
    }

    fn inbound(text: &str) -> InboundMessage {
        InboundMessage {
            sender: "919800000001".into(),
            text: text.into(),
            display_name: Some("Asha".into()),
        }
    }

    #[tokio::test]
    async fn greeting_replies_with_menu_and_no_order() {
        let harness = TestHarness::new().await.unwrap();
        let outcome = interpreter(&harness)
            .handle_inbound(&inbound("  Hello "))
            .await
            .unwrap();

        assert!(outcome.order.is_none());
        assert!(outcome.reply.contains("*Burgers*"));
        assert!(outcome.reply.contains("Chicken Pizza - ₹249.50"));
        assert!(outcome.delivered);
        assert_eq!(harness.transport.delivered_texts().await, vec![outcome.reply]);
    }

    #[tokio::test]
    async fn order_message_creates_pending_order() {
        let harness = TestHarness::new().await.unwrap();
        let outcome = interpreter(&harness)
            .handle_inbound(&inbound("2 chiken pizza"))
            .await
            .unwrap();

        let order = outcome.order.expect("order should be created");
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].name, "Chicken Pizza");
        assert_eq!(order.items[0].quantity, 2);
        assert_eq!(order.total.to_string(), "499.00");
        assert!(outcome.reply.contains(&format!("#{}", order.id)));
        assert!(outcome.reply.contains("2 x Chicken Pizza"));
        assert!(outcome.reply.contains("₹499.00"));
    }

    #[tokio::test]
    async fn unknown_text_gets_fallback() {
        let harness = TestHarness::new().await.unwrap();
        let outcome = interpreter(&harness)
            .handle_inbound(&inbound("when do you open?"))
            .await
            .unwrap();
        assert!(outcome.order.is_none());
        assert_eq!(outcome.reply, FALLBACK_REPLY);
    }

    #[tokio::test]
    async fn greeting_must_be_the_whole_message() {
        let harness = TestHarness::new().await.unwrap();
        let outcome = interpreter(&harness)
            .handle_inbound(&inbound("hi there"))
            .await
            .unwrap();
        assert_eq!(outcome.reply, FALLBACK_REPLY);
    }

    #[tokio::test]
    async fn empty_catalog_gets_notice() {
        let harness = TestHarness::builder()
            .with_catalog(vec![])
            .build()
            .await
            .unwrap();
        let interp = interpreter(&harness);
        for text in ["menu", "2 pizza"] {
            let outcome = interp.handle_inbound(&inbound(text)).await.unwrap();
            assert_eq!(outcome.reply, EMPTY_MENU_REPLY);
            assert!(outcome.order.is_none());
        }
    }

    #[tokio::test]
    async fn history_records_both_directions() {
        let harness = TestHarness::new().await.unwrap();
        let outcome = interpreter(&harness)
            .handle_inbound(&inbound("1 veg burger"))
            .await
            .unwrap();

        let history = harness
            .storage
            .messages_for_customer(outcome.customer.id)
            .await
            .unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].direction, Direction::In);
        assert_eq!(history[0].body, "1 veg burger");
        assert_eq!(history[1].direction, Direction::Out);
        assert_eq!(history[1].body, outcome.reply);
        assert_eq!(outcome.customer.name, "Asha");
    }

    #[tokio::test]
    async fn failed_delivery_keeps_order_and_history() {
        let harness = TestHarness::builder()
            .with_broken_transport()
            .build()
            .await
            .unwrap();
        let outcome = interpreter(&harness)
            .handle_inbound(&inbound("3 masala fries"))
            .await
            .unwrap();

        assert!(!outcome.delivered);
        let order = outcome.order.unwrap();
        assert!(harness.storage.get_order(order.id).await.unwrap().is_some());
        let history = harness
            .storage
            .messages_for_customer(outcome.customer.id)
            .await
            .unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(harness.transport.attempt_count().await, 3);
    }
}
