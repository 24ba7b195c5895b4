// SPDX-FileCopyrightText: 2026 Storefront Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation handling and order recovery for the Storefront commerce channel.
//!
//! [`Storefront`] wires the pieces that share a storage adapter, a transport,
//! and a shutdown token:
//! - [`MessageInterpreter`] turns customer texts into replies and orders
//! - [`RecoveryWorker`] reminds customers about stalled orders
//! - [`AdminActions`] exposes operator triggers
//! - [`DispatchClient`] retries outbound sends for all of them

pub mod admin;
pub mod dispatch;
pub mod interpreter;
pub mod matcher;
pub mod menu;
pub mod recovery;
pub mod shutdown;

use std::sync::Arc;

use storefront_config::model::StorefrontConfig;
use storefront_core::{MessagingTransport, StorageAdapter};
use tokio_util::sync::CancellationToken;
use tracing::info;

pub use admin::AdminActions;
pub use dispatch::{DispatchClient, DispatchOutcome, RetryPolicy};
pub use interpreter::{InterpretOutcome, MessageInterpreter};
pub use recovery::{RecoveryWorker, TickReport};

/// The assembled channel: one dispatch client shared by every component.
pub struct Storefront {
    pub interpreter: Arc<MessageInterpreter>,
    pub recovery: Arc<RecoveryWorker>,
    pub admin: Arc<AdminActions>,
    pub dispatch: Arc<DispatchClient>,
}

impl Storefront {
    /// Build every component over an already-initialized storage adapter.
    pub fn new(
        config: &StorefrontConfig,
        storage: Arc<dyn StorageAdapter>,
        transport: Arc<dyn MessagingTransport>,
        cancel: CancellationToken,
    ) -> Self {
        let dispatch = Arc::new(
            DispatchClient::new(transport, RetryPolicy::from(&config.dispatch))
                .with_cancellation(cancel),
        );
        let interpreter = Arc::new(MessageInterpreter::new(
            storage.clone(),
            dispatch.clone(),
            config.storefront.currency_symbol.clone(),
        ));
        let recovery = Arc::new(RecoveryWorker::new(
            storage.clone(),
            dispatch.clone(),
            config.recovery.clone(),
        ));
        let admin = Arc::new(AdminActions::new(
            storage,
            dispatch.clone(),
            recovery.clone(),
            config.recovery.clone(),
            config.storefront.currency_symbol.clone(),
        ));

        info!(
            agent_name = config.agent.name.as_str(),
            max_attempts = dispatch.policy().max_attempts,
            "storefront initialized"
        );

        Self {
            interpreter,
            recovery,
            admin,
            dispatch,
        }
    }
}
