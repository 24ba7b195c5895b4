// SPDX-FileCopyrightText: 2026 Storefront Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for integration testing.
//!
//! `TestHarness` assembles temp SQLite storage seeded with a catalog, a
//! [`MockTransport`], and a config tuned for fast tests (no retry delay).

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use storefront_config::model::{StorageConfig, StorefrontConfig};
use storefront_core::types::{CatalogItem, LineItem, NewOrder, Order};
use storefront_core::{StorageAdapter, StorefrontError};
use storefront_storage::SqliteStorage;
use tracing::debug;

use crate::mock_transport::MockTransport;

/// The catalog tests run against unless they supply their own.
pub fn sample_catalog() -> Vec<CatalogItem> {
    vec![
        CatalogItem::new("Veg Burger", Decimal::new(12000, 2), Some("Burgers")),
        CatalogItem::new("Chicken Burger", Decimal::new(15000, 2), Some("Burgers")),
        CatalogItem::new("Chicken Pizza", Decimal::new(24950, 2), Some("Pizza")),
        CatalogItem::new("Masala Fries", Decimal::new(9000, 2), None),
    ]
}

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    catalog: Vec<CatalogItem>,
    transport: MockTransport,
    config: StorefrontConfig,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        let mut config = StorefrontConfig::default();
        config.dispatch.retry_delay_ms = 0;
        Self {
            catalog: sample_catalog(),
            transport: MockTransport::new(),
            config,
        }
    }

    /// Replace the seeded catalog.
    pub fn with_catalog(mut self, catalog: Vec<CatalogItem>) -> Self {
        self.catalog = catalog;
        self
    }

    /// Use a transport that fails the first `failures` sends.
    pub fn with_failing_transport(mut self, failures: u32) -> Self {
        self.transport = MockTransport::failing(failures);
        self
    }

    /// Use a transport that never delivers.
    pub fn with_broken_transport(mut self) -> Self {
        self.transport = MockTransport::always_failing();
        self
    }

    /// Adjust the config before the harness is built.
    pub fn with_config(mut self, edit: impl FnOnce(&mut StorefrontConfig)) -> Self {
        edit(&mut self.config);
        self
    }

    /// Build the test harness, creating and seeding the database.
    pub async fn build(self) -> Result<TestHarness, StorefrontError> {
        let temp_dir = tempfile::TempDir::new().map_err(StorefrontError::storage)?;
        let db_path = temp_dir.path().join("test.db");

        let mut config = self.config;
        config.storage = StorageConfig {
            database_path: db_path.to_string_lossy().to_string(),
            wal_mode: true,
        };

        let storage = SqliteStorage::new(config.storage.clone());
        storage.initialize().await?;
        storage.replace_catalog(&self.catalog).await?;
        let storage: Arc<dyn StorageAdapter> = Arc::new(storage);
        debug!(
            path = %config.storage.database_path,
            items = self.catalog.len(),
            "test harness ready"
        );

        Ok(TestHarness {
            storage,
            transport: Arc::new(self.transport),
            config,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete test environment with a mock transport and temp storage.
pub struct TestHarness {
    pub storage: Arc<dyn StorageAdapter>,
    pub transport: Arc<MockTransport>,
    pub config: StorefrontConfig,
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Harness with the sample catalog and an always-succeeding transport.
    pub async fn new() -> Result<Self, StorefrontError> {
        Self::builder().build().await
    }

    /// Create (or reuse) a customer and place a single-item pending order
    /// for them at `created_at`.
    pub async fn place_order(
        &self,
        phone: &str,
        name: Option<&str>,
        item: &str,
        quantity: u32,
        created_at: DateTime<Utc>,
    ) -> Result<Order, StorefrontError> {
        let customer = self
            .storage
            .upsert_customer(phone, name, created_at)
            .await?;
        let unit_price = self
            .storage
            .load_catalog()
            .await?
            .into_iter()
            .find(|c| c.name == item)
            .map_or(Decimal::ONE, |c| c.price);
        self.storage
            .create_order(&NewOrder {
                customer_id: customer.id,
                items: vec![LineItem {
                    name: item.to_string(),
                    unit_price,
                    quantity,
                }],
                created_at,
            })
            .await
    }
}
