// SPDX-FileCopyrightText: 2026 Storefront Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.

use crate::diagnostic::ConfigError;
use crate::model::{MAX_RECOVERY_MINUTES, MAX_TICK_INTERVAL_SECS, StorefrontConfig};

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every problem rather than stopping at the first.
pub fn validate_config(config: &StorefrontConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    if config.storage.database_path.trim().is_empty() {
        fail("storage.database_path must not be empty".to_string());
    }

    if config.dispatch.max_attempts < 1 {
        fail(format!(
            "dispatch.max_attempts must be at least 1, got {}",
            config.dispatch.max_attempts
        ));
    }

    let tick = config.recovery.tick_interval_secs;
    if !(1..=MAX_TICK_INTERVAL_SECS).contains(&tick) {
        fail(format!(
            "recovery.tick_interval_secs must be between 1 and {MAX_TICK_INTERVAL_SECS}, got {tick}"
        ));
    }

    let threshold = config.recovery.abandoned_threshold_minutes;
    if !(1..=MAX_RECOVERY_MINUTES).contains(&threshold) {
        fail(format!(
            "recovery.abandoned_threshold_minutes must be between 1 and {MAX_RECOVERY_MINUTES}, got {threshold}"
        ));
    }

    let backdate = config.recovery.simulated_backdate_minutes;
    if backdate > MAX_RECOVERY_MINUTES {
        fail(format!(
            "recovery.simulated_backdate_minutes must be at most {MAX_RECOVERY_MINUTES}, got {backdate}"
        ));
    }

    if config.recovery.template_name.trim().is_empty() {
        fail("recovery.template_name must not be empty".to_string());
    }

    if config.whatsapp.request_timeout_secs < 1 {
        fail("whatsapp.request_timeout_secs must be at least 1".to_string());
    }

    let addr = config.webhook.bind_address.trim();
    if addr.is_empty() {
        fail("webhook.bind_address must not be empty".to_string());
    } else {
        let is_valid_ip = addr.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = addr
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-');
        if !is_valid_ip && !is_valid_hostname {
            fail(format!(
                "webhook.bind_address `{addr}` is not a valid IP address or hostname"
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
