// SPDX-FileCopyrightText: 2026 Storefront Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the StorageAdapter trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::OnceCell;
use tracing::debug;

use storefront_config::model::StorageConfig;
use storefront_core::types::{
    AutomationEvent, CatalogItem, Customer, CustomerId, DailyStats, Direction, Message, NewEvent,
    NewOrder, Order, OrderId, OrderStatus, RecoveryCandidate,
};
use storefront_core::{AdapterType, HealthStatus, PluginAdapter, StorageAdapter, StorefrontError};

use crate::database::{Database, map_tr_err};
use crate::queries;

/// SQLite-backed storage adapter.
///
/// Wraps a [`Database`] handle and delegates all query operations to the
/// typed query modules. The database is opened on the first call to
/// [`StorageAdapter::initialize`].
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    /// Create a new SqliteStorage with the given configuration.
    ///
    /// The database connection is not opened until `initialize` is called.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    fn db(&self) -> Result<&Database, StorefrontError> {
        self.db.get().ok_or_else(|| StorefrontError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, StorefrontError> {
        let db = self.db()?;
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), StorefrontError> {
        if let Some(db) = self.db.get() {
            db.checkpoint().await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    async fn initialize(&self) -> Result<(), StorefrontError> {
        let path = self.config.database_path.clone();
        let db = Database::open_with(&path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| StorefrontError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), StorefrontError> {
        self.db()?.checkpoint().await?;
        debug!("WAL checkpoint complete");
        Ok(())
    }

    // --- Customers ---

    async fn upsert_customer(
        &self,
        phone: &str,
        name: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Customer, StorefrontError> {
        queries::customers::upsert_customer(self.db()?, phone, name, now).await
    }

    async fn get_customer(&self, id: CustomerId) -> Result<Option<Customer>, StorefrontError> {
        queries::customers::get_customer(self.db()?, id).await
    }

    // --- Conversation history ---

    async fn insert_message(
        &self,
        customer_id: CustomerId,
        direction: Direction,
        body: &str,
        now: DateTime<Utc>,
    ) -> Result<Message, StorefrontError> {
        queries::messages::insert_message(self.db()?, customer_id, direction, body, now).await
    }

    async fn messages_for_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<Message>, StorefrontError> {
        queries::messages::messages_for_customer(self.db()?, customer_id).await
    }

    // --- Catalog ---

    async fn load_catalog(&self) -> Result<Vec<CatalogItem>, StorefrontError> {
        queries::catalog::load_catalog(self.db()?).await
    }

    async fn replace_catalog(&self, items: &[CatalogItem]) -> Result<(), StorefrontError> {
        queries::catalog::replace_catalog(self.db()?, items).await
    }

    // --- Order ledger ---

    async fn create_order(&self, order: &NewOrder) -> Result<Order, StorefrontError> {
        queries::orders::create_order(self.db()?, order).await
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>, StorefrontError> {
        queries::orders::get_order(self.db()?, id).await
    }

    async fn transition_order(
        &self,
        id: OrderId,
        to: OrderStatus,
        now: DateTime<Utc>,
    ) -> Result<Order, StorefrontError> {
        queries::orders::transition_order(self.db()?, id, to, now).await
    }

    async fn manual_abandon(
        &self,
        id: OrderId,
        now: DateTime<Utc>,
    ) -> Result<bool, StorefrontError> {
        queries::orders::manual_abandon(self.db()?, id, now).await
    }

    // --- Recovery ---

    async fn recovery_candidates(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<RecoveryCandidate>, StorefrontError> {
        queries::recovery::recovery_candidates(self.db()?, cutoff).await
    }

    async fn recovery_candidate(
        &self,
        order_id: OrderId,
    ) -> Result<Option<RecoveryCandidate>, StorefrontError> {
        queries::recovery::recovery_candidate(self.db()?, order_id).await
    }

    async fn has_reminder_sent(&self, order_id: OrderId) -> Result<bool, StorefrontError> {
        queries::events::has_reminder_sent(self.db()?, order_id).await
    }

    // --- Event log ---

    async fn record_event(&self, event: &NewEvent) -> Result<Option<i64>, StorefrontError> {
        queries::events::record_event(self.db()?, event).await
    }

    async fn events_for_order(
        &self,
        order_id: OrderId,
    ) -> Result<Vec<AutomationEvent>, StorefrontError> {
        queries::events::events_for_order(self.db()?, order_id).await
    }

    // --- Reporting ---

    async fn daily_stats(&self, since: DateTime<Utc>) -> Result<DailyStats, StorefrontError> {
        queries::stats::daily_stats(self.db()?, since).await
    }
}
