// SPDX-FileCopyrightText: 2026 Storefront Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Storefront commerce channel.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Storefront configuration.
///
/// Every section is optional and defaults to working values, so an empty
/// file (or no file at all) yields a usable config apart from credentials.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorefrontConfig {
    /// Process identity and logging.
    #[serde(default)]
    pub agent: AgentConfig,

    /// SQLite storage settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// WhatsApp Cloud API credentials and endpoint.
    #[serde(default)]
    pub whatsapp: WhatsAppConfig,

    /// Outbound retry policy.
    #[serde(default)]
    pub dispatch: DispatchConfig,

    /// Abandoned-order recovery worker.
    #[serde(default)]
    pub recovery: RecoveryConfig,

    /// Merchant presentation settings.
    #[serde(default)]
    pub storefront: StorefrontSettings,

    /// Inbound webhook receiver.
    #[serde(default)]
    pub webhook: WebhookConfig,
}

/// Process identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Name used in logs.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_agent_name() -> String {
    "storefront".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    "storefront.db".to_string()
}

fn default_wal_mode() -> bool {
    true
}

/// WhatsApp Cloud API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WhatsAppConfig {
    /// Bearer token for the Graph API. `None` disables outbound delivery.
    #[serde(default)]
    pub access_token: Option<String>,

    /// Business phone number ID messages are sent from.
    #[serde(default)]
    pub phone_number_id: Option<String>,

    /// Graph API base URL, including the version segment.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for WhatsAppConfig {
    fn default() -> Self {
        Self {
            access_token: None,
            phone_number_id: None,
            api_base_url: default_api_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_api_base_url() -> String {
    "https://graph.facebook.com/v17.0".to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

/// Bounded retry policy for outbound messages.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DispatchConfig {
    /// Total attempts per send, including the first.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Fixed pause between attempts, in milliseconds.
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    1000
}

/// Upper bound for the recovery threshold and the synthetic backdate (one year).
pub const MAX_RECOVERY_MINUTES: u64 = 525_600;

/// Upper bound for the recovery tick interval (one day).
pub const MAX_TICK_INTERVAL_SECS: u64 = 86_400;

/// Abandoned-order recovery configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RecoveryConfig {
    /// Run the recovery worker under `serve`.
    #[serde(default = "default_recovery_enabled")]
    pub enabled: bool,

    /// Seconds between scheduler ticks.
    #[serde(default = "default_tick_interval_secs")]
    pub tick_interval_secs: u64,

    /// Minimum age of a pending order before it is reminded.
    #[serde(default = "default_abandoned_threshold_minutes")]
    pub abandoned_threshold_minutes: u64,

    /// Name of the approved reminder template.
    #[serde(default = "default_template_name")]
    pub template_name: String,

    /// Language code of the reminder template.
    #[serde(default = "default_template_language")]
    pub template_language: String,

    /// How far back synthetic abandoned orders are dated.
    #[serde(default = "default_simulated_backdate_minutes")]
    pub simulated_backdate_minutes: u64,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            enabled: default_recovery_enabled(),
            tick_interval_secs: default_tick_interval_secs(),
            abandoned_threshold_minutes: default_abandoned_threshold_minutes(),
            template_name: default_template_name(),
            template_language: default_template_language(),
            simulated_backdate_minutes: default_simulated_backdate_minutes(),
        }
    }
}

fn default_recovery_enabled() -> bool {
    true
}

fn default_tick_interval_secs() -> u64 {
    60
}

fn default_abandoned_threshold_minutes() -> u64 {
    15
}

fn default_template_name() -> String {
    "abandoned_cart".to_string()
}

fn default_template_language() -> String {
    "en_US".to_string()
}

fn default_simulated_backdate_minutes() -> u64 {
    20
}

/// Merchant presentation settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorefrontSettings {
    /// Prefix printed before prices in replies.
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
}

impl Default for StorefrontSettings {
    fn default() -> Self {
        Self {
            currency_symbol: default_currency_symbol(),
        }
    }
}

fn default_currency_symbol() -> String {
    "₹".to_string()
}

/// Inbound webhook receiver configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WebhookConfig {
    /// Address to bind the receiver to.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Token echoed back during the provider's subscription handshake.
    /// `None` rejects every verification request.
    #[serde(default)]
    pub verify_token: Option<String>,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            verify_token: None,
        }
    }
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    4000
}
