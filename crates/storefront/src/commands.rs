// SPDX-FileCopyrightText: 2026 Storefront Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! One-shot operator commands run against the configured database.

use rust_decimal::Decimal;
use storefront_agent::{AdminActions, DispatchOutcome, Storefront};
use storefront_config::model::StorefrontConfig;
use storefront_core::types::{CustomerId, OrderId, OrderStatus};
use storefront_core::StorefrontError;
use tokio_util::sync::CancellationToken;

use crate::serve::Adapters;

/// An operator action, decoupled from its CLI spelling.
#[derive(Debug, Clone, PartialEq)]
pub enum AdminCommand {
    Abandon { order_id: OrderId },
    Complete { order_id: OrderId },
    Remind { order_id: OrderId },
    Summary { phone: String },
    SimulateAbandon { customer_id: CustomerId, amount: Decimal },
    Message { customer_id: CustomerId, text: String },
}

/// Open the adapters, run `command`, and close them again.
pub async fn run_admin(
    config: StorefrontConfig,
    command: AdminCommand,
) -> Result<String, StorefrontError> {
    let adapters = Adapters::open(&config).await?;
    let app = Storefront::new(
        &config,
        adapters.storage.clone(),
        adapters.transport.clone(),
        CancellationToken::new(),
    );
    let result = execute(&app.admin, command).await;
    adapters.close().await;
    result
}

/// Run one command and describe the result for the operator.
pub async fn execute(admin: &AdminActions, command: AdminCommand) -> Result<String, StorefrontError> {
    match command {
        AdminCommand::Abandon { order_id } => Ok(if admin.manual_abandon(order_id).await {
            format!("order #{order_id} marked abandoned")
        } else {
            format!("order #{order_id} not abandoned (missing or completed)")
        }),
        AdminCommand::Complete { order_id } => {
            let order = admin.transition_order(order_id, OrderStatus::Completed).await?;
            Ok(format!("order #{} is {}", order.id, order.status))
        }
        AdminCommand::Remind { order_id } => Ok(if admin.send_recovery_now(order_id).await? {
            format!("reminder sent for order #{order_id}")
        } else {
            format!("reminder for order #{order_id} failed after retries")
        }),
        AdminCommand::Summary { phone } => {
            let outcome = admin.send_summary_now(&phone).await?;
            Ok(describe_delivery("summary", &phone, &outcome))
        }
        AdminCommand::SimulateAbandon {
            customer_id,
            amount,
        } => {
            let order = admin.simulate_abandoned_order(customer_id, amount).await?;
            Ok(format!(
                "created pending order #{} for customer {} dated {}",
                order.id,
                customer_id,
                order.created_at.to_rfc3339()
            ))
        }
        AdminCommand::Message { customer_id, text } => {
            let outcome = admin.message_customer(customer_id, &text).await?;
            Ok(describe_delivery("message", &customer_id.to_string(), &outcome))
        }
    }
}

fn describe_delivery(what: &str, to: &str, outcome: &DispatchOutcome) -> String {
    if outcome.delivered {
        format!("{what} delivered to {to}")
    } else {
        format!(
            "{what} to {to} failed after {} attempt(s): {}",
            outcome.attempts,
            outcome.last_error.as_deref().unwrap_or("unknown error")
        )
    }
}
