// SPDX-FileCopyrightText: 2026 Storefront Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Storefront conversational commerce channel.
//!
//! This crate provides the domain types, the error type, and the adapter
//! traits that the storage and messaging crates implement.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::StorefrontError;
pub use types::{
    AdapterType, CatalogItem, Customer, CustomerId, Direction, EventType, HealthStatus,
    InboundMessage, LineItem, Order, OrderId, OrderStatus, OutboundPayload,
};

pub use traits::{MessagingTransport, PluginAdapter, StorageAdapter};
