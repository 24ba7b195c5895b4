// SPDX-FileCopyrightText: 2026 Storefront Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage adapter trait covering the customer book, order ledger, and event log.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::StorefrontError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{
    AutomationEvent, CatalogItem, Customer, CustomerId, DailyStats, Direction, Message,
    NewEvent, NewOrder, Order, OrderId, OrderStatus, RecoveryCandidate,
};

/// Persistence backend for the storefront.
///
/// The order ledger and event log are only written through this trait.
#[async_trait]
pub trait StorageAdapter: PluginAdapter {
    /// Initializes the storage backend (migrations, connection).
    async fn initialize(&self) -> Result<(), StorefrontError>;

    /// Closes the storage backend, flushing pending writes.
    async fn close(&self) -> Result<(), StorefrontError>;

    // --- Customers ---

    /// Create the customer on first contact or refresh `last_contacted`
    /// (and the name, when one is given) on later contact.
    async fn upsert_customer(
        &self,
        phone: &str,
        name: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Customer, StorefrontError>;

    async fn get_customer(&self, id: CustomerId) -> Result<Option<Customer>, StorefrontError>;

    // --- Conversation history ---

    async fn insert_message(
        &self,
        customer_id: CustomerId,
        direction: Direction,
        body: &str,
        now: DateTime<Utc>,
    ) -> Result<Message, StorefrontError>;

    async fn messages_for_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<Message>, StorefrontError>;

    // --- Catalog ---

    /// The merchant's catalog in menu order.
    async fn load_catalog(&self) -> Result<Vec<CatalogItem>, StorefrontError>;

    /// Replace the whole catalog. Used by the menu editor import and seeding.
    async fn replace_catalog(&self, items: &[CatalogItem]) -> Result<(), StorefrontError>;

    // --- Order ledger ---

    async fn create_order(&self, order: &NewOrder) -> Result<Order, StorefrontError>;

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>, StorefrontError>;

    /// Move an order along its lifecycle. Returns the updated order.
    async fn transition_order(
        &self,
        id: OrderId,
        to: OrderStatus,
        now: DateTime<Utc>,
    ) -> Result<Order, StorefrontError>;

    /// Force an order to `Abandoned` and append a `ManualAbandon` event in
    /// one transaction. Returns `false` when the order is missing or completed.
    async fn manual_abandon(&self, id: OrderId, now: DateTime<Utc>)
        -> Result<bool, StorefrontError>;

    // --- Recovery ---

    /// Pending orders created before `cutoff` with no `ReminderSent` event and
    /// no inbound message from the customer after the order was created.
    async fn recovery_candidates(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<RecoveryCandidate>, StorefrontError>;

    /// The recovery details of one order, ignoring eligibility.
    async fn recovery_candidate(
        &self,
        order_id: OrderId,
    ) -> Result<Option<RecoveryCandidate>, StorefrontError>;

    async fn has_reminder_sent(&self, order_id: OrderId) -> Result<bool, StorefrontError>;

    // --- Event log ---

    /// Append an event. Returns `None` when the insert was skipped because a
    /// `ReminderSent` row for the same order already exists.
    async fn record_event(&self, event: &NewEvent) -> Result<Option<i64>, StorefrontError>;

    async fn events_for_order(
        &self,
        order_id: OrderId,
    ) -> Result<Vec<AutomationEvent>, StorefrontError>;

    // --- Reporting ---

    async fn daily_stats(&self, since: DateTime<Utc>) -> Result<DailyStats, StorefrontError>;
}
