// SPDX-FileCopyrightText: 2026 Storefront Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across the ledger, the interpreter, and the recovery worker.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Row identifier of a customer.
pub type CustomerId = i64;

/// Row identifier of an order.
pub type OrderId = i64;

/// Category assigned to catalog items that do not name one.
pub const DEFAULT_CATEGORY: &str = "Others";

/// Display name recorded for customers whose transport metadata carries none.
pub const UNKNOWN_CUSTOMER_NAME: &str = "Unknown";

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter behind a trait object.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Storage,
    Transport,
}

/// A person talking to the storefront, keyed by phone number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub phone: String,
    pub name: String,
    pub last_contacted: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// One product in the merchant's menu.
///
/// The category is optional in storage; [`CatalogItem::category`] applies the
/// default at read time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub name: String,
    pub price: Decimal,
    #[serde(default)]
    pub category: Option<String>,
}

impl CatalogItem {
    pub fn new(name: impl Into<String>, price: Decimal, category: Option<&str>) -> Self {
        Self {
            name: name.into(),
            price,
            category: category.map(str::to_string),
        }
    }

    /// The item's category, or [`DEFAULT_CATEGORY`] when blank or absent.
    pub fn category(&self) -> &str {
        match self.category.as_deref().map(str::trim) {
            Some(c) if !c.is_empty() => c,
            _ => DEFAULT_CATEGORY,
        }
    }
}

/// A single ordered product with the price captured at order time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub name: String,
    pub unit_price: Decimal,
    pub quantity: u32,
}

impl LineItem {
    pub fn subtotal(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Lifecycle state of an order. `Completed` and `Abandoned` are terminal.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Completed,
    Abandoned,
}

impl OrderStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, OrderStatus::Pending)
    }

    /// Whether the lifecycle permits moving from `self` to `to`.
    ///
    /// Staying in the same state is allowed so that repeated terminal
    /// transitions are no-ops rather than errors.
    pub fn can_transition_to(self, to: OrderStatus) -> bool {
        self == to || (self == OrderStatus::Pending && to.is_terminal())
    }
}

/// A persisted order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub customer_id: CustomerId,
    pub items: Vec<LineItem>,
    pub total: Decimal,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn first_item_name(&self) -> Option<&str> {
        self.items.first().map(|i| i.name.as_str())
    }
}

/// An order about to be written. Always starts out `Pending`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub customer_id: CustomerId,
    pub items: Vec<LineItem>,
    pub created_at: DateTime<Utc>,
}

impl NewOrder {
    pub fn total(&self) -> Decimal {
        self.items.iter().map(LineItem::subtotal).sum()
    }
}

/// Direction of a conversation message relative to the storefront.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    In,
    Out,
}

/// One line of the conversation history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    pub customer_id: CustomerId,
    pub direction: Direction,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// Kind of recovery action recorded in the event log.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    ReminderSent,
    ReminderFailed,
    ManualAbandon,
}

/// An appended automation event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutomationEvent {
    pub id: i64,
    pub customer_id: CustomerId,
    pub order_id: Option<OrderId>,
    pub event_type: EventType,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// An automation event about to be appended.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEvent {
    pub customer_id: CustomerId,
    pub order_id: OrderId,
    pub event_type: EventType,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// A pending order joined with the customer details needed to remind them.
#[derive(Debug, Clone, PartialEq)]
pub struct RecoveryCandidate {
    pub order_id: OrderId,
    pub customer_id: CustomerId,
    pub phone: String,
    pub customer_name: Option<String>,
    pub first_item: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A customer message after provider-specific decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// Sender phone identifier.
    pub sender: String,
    /// Text body as typed by the customer.
    pub text: String,
    /// Contact display name from the provider, when it sent one.
    pub display_name: Option<String>,
}

/// What the transport is asked to deliver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundPayload {
    /// Free-form text.
    Text(String),
    /// A pre-approved template with positional text parameters.
    Template {
        name: String,
        language: String,
        parameters: Vec<String>,
    },
}

/// Aggregate order figures for a reporting window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyStats {
    pub new_orders: u64,
    pub total_revenue: Decimal,
    pub abandoned_count: u64,
    pub lost_revenue: Decimal,
    pub recovered_count: u64,
}
