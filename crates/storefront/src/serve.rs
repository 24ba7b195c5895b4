// SPDX-FileCopyrightText: 2026 Storefront Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `storefront serve` command implementation.
//!
//! Opens SQLite storage and the WhatsApp transport, starts the recovery
//! worker, and serves the webhook receiver until SIGINT or SIGTERM.

use std::sync::Arc;
use std::time::Duration;

use storefront_agent::{Storefront, shutdown};
use storefront_config::model::StorefrontConfig;
use storefront_core::{
    HealthStatus, MessagingTransport, PluginAdapter, StorageAdapter, StorefrontError,
};
use storefront_storage::SqliteStorage;
use storefront_whatsapp::WhatsAppTransport;
use tracing::{error, info, warn};

use crate::webhook::{self, WebhookState};

/// How long the recovery worker gets to finish its current tick.
const WORKER_DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

/// Storage and transport opened from config, ready to be wired.
pub struct Adapters {
    pub storage: Arc<dyn StorageAdapter>,
    pub transport: Arc<dyn MessagingTransport>,
}

impl Adapters {
    pub async fn open(config: &StorefrontConfig) -> Result<Self, StorefrontError> {
        let storage = SqliteStorage::new(config.storage.clone());
        storage.initialize().await?;

        let transport = WhatsAppTransport::new(config.whatsapp.clone())?;
        match transport.health_check().await {
            Ok(HealthStatus::Healthy) => {}
            Ok(HealthStatus::Degraded(reason)) | Ok(HealthStatus::Unhealthy(reason)) => {
                warn!(reason = reason.as_str(), "whatsapp transport not fully configured");
            }
            Err(e) => warn!(error = %e, "whatsapp transport health check failed"),
        }

        Ok(Self {
            storage: Arc::new(storage),
            transport: Arc::new(transport),
        })
    }

    pub async fn close(&self) {
        if let Err(e) = self.transport.shutdown().await {
            warn!(error = %e, "transport shutdown failed");
        }
        if let Err(e) = self.storage.close().await {
            error!(error = %e, "storage close failed");
        }
    }
}

/// Runs the `storefront serve` command.
pub async fn run_serve(config: StorefrontConfig) -> Result<(), StorefrontError> {
    info!(agent_name = config.agent.name.as_str(), "starting storefront serve");

    let adapters = Adapters::open(&config).await?;
    let cancel = shutdown::install_signal_handler();
    let app = Storefront::new(
        &config,
        adapters.storage.clone(),
        adapters.transport.clone(),
        cancel.clone(),
    );

    let worker = if config.recovery.enabled {
        Some(app.recovery.clone().spawn(cancel.clone()))
    } else {
        info!("recovery worker disabled by configuration");
        None
    };

    let state = WebhookState {
        interpreter: app.interpreter.clone(),
        storage: adapters.storage.clone(),
        verify_token: config.webhook.verify_token.clone(),
    };
    if state.verify_token.is_none() {
        warn!("webhook.verify_token not set, subscription handshakes will be refused");
    }

    let served = webhook::start_server(&config.webhook, state, cancel.clone()).await;
    if let Err(e) = &served {
        error!(error = %e, "webhook receiver stopped");
    }

    cancel.cancel();
    if let Some(handle) = worker {
        shutdown::drain_task("recovery", handle, WORKER_DRAIN_TIMEOUT).await;
    }
    adapters.close().await;

    info!("storefront serve shutdown complete");
    served
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over `agent.log_level` when set.
pub fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("storefront={log_level},warn")));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
