// SPDX-FileCopyrightText: 2026 Storefront Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Storefront configuration system.

use storefront_config::diagnostic::ConfigError;
use storefront_config::model::StorefrontConfig;
use storefront_config::{load_and_validate_str, load_config_from_str};

/// Valid TOML with all known sections deserializes successfully.
#[test]
fn valid_toml_deserializes_into_config() {
    let toml = r#"
[agent]
name = "corner-cafe"
log_level = "debug"

[storage]
database_path = "/tmp/cafe.db"
wal_mode = false

[whatsapp]
access_token = "EAAG-test"
phone_number_id = "1234567890"
request_timeout_secs = 5

[dispatch]
max_attempts = 5
retry_delay_ms = 250

[recovery]
enabled = false
tick_interval_secs = 30
abandoned_threshold_minutes = 45
template_name = "cart_nudge"
template_language = "en_GB"

[storefront]
currency_symbol = "$"

[webhook]
bind_address = "0.0.0.0"
port = 8080
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.agent.name, "corner-cafe");
    assert_eq!(config.agent.log_level, "debug");
    assert_eq!(config.storage.database_path, "/tmp/cafe.db");
    assert!(!config.storage.wal_mode);
    assert_eq!(config.whatsapp.access_token.as_deref(), Some("EAAG-test"));
    assert_eq!(config.whatsapp.phone_number_id.as_deref(), Some("1234567890"));
    assert_eq!(config.whatsapp.request_timeout_secs, 5);
    assert_eq!(config.dispatch.max_attempts, 5);
    assert_eq!(config.dispatch.retry_delay_ms, 250);
    assert!(!config.recovery.enabled);
    assert_eq!(config.recovery.tick_interval_secs, 30);
    assert_eq!(config.recovery.abandoned_threshold_minutes, 45);
    assert_eq!(config.recovery.template_name, "cart_nudge");
    assert_eq!(config.recovery.template_language, "en_GB");
    assert_eq!(config.storefront.currency_symbol, "$");
    assert_eq!(config.webhook.bind_address, "0.0.0.0");
    assert_eq!(config.webhook.port, 8080);
}

/// An empty file yields the documented defaults.
#[test]
fn missing_sections_use_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");

    assert_eq!(config.agent.name, "storefront");
    assert_eq!(config.agent.log_level, "info");
    assert_eq!(config.storage.database_path, "storefront.db");
    assert!(config.storage.wal_mode);
    assert!(config.whatsapp.access_token.is_none());
    assert_eq!(config.whatsapp.api_base_url, "https://graph.facebook.com/v17.0");
    assert_eq!(config.dispatch.max_attempts, 3);
    assert_eq!(config.dispatch.retry_delay_ms, 1000);
    assert!(config.recovery.enabled);
    assert_eq!(config.recovery.tick_interval_secs, 60);
    assert_eq!(config.recovery.abandoned_threshold_minutes, 15);
    assert_eq!(config.recovery.template_name, "abandoned_cart");
    assert_eq!(config.recovery.template_language, "en_US");
    assert_eq!(config.recovery.simulated_backdate_minutes, 20);
    assert_eq!(config.storefront.currency_symbol, "₹");
    assert_eq!(config.webhook.port, 4000);
}

/// Dotted overrides (what the env provider produces) land on the right key.
#[test]
fn dotted_override_sets_nested_key() {
    use figment::{
        Figment,
        providers::{Format, Serialized, Toml},
    };

    let config: StorefrontConfig = Figment::new()
        .merge(Serialized::defaults(StorefrontConfig::default()))
        .merge(Toml::string("[whatsapp]\naccess_token = \"from-file\"\n"))
        .merge(("whatsapp.access_token", "from-env"))
        .merge(("recovery.abandoned_threshold_minutes", 5))
        .extract()
        .expect("should merge overrides");

    assert_eq!(config.whatsapp.access_token.as_deref(), Some("from-env"));
    assert_eq!(config.recovery.abandoned_threshold_minutes, 5);
}

/// Missing config files are silently skipped.
#[test]
fn missing_config_files_silently_skipped() {
    use figment::{
        Figment,
        providers::{Format, Serialized, Toml},
    };

    let config: StorefrontConfig = Figment::new()
        .merge(Serialized::defaults(StorefrontConfig::default()))
        .merge(Toml::file("/nonexistent/path/storefront.toml"))
        .extract()
        .expect("missing file should be silently skipped");

    assert_eq!(config.agent.name, "storefront");
}

/// Unknown key in a section is reported with a suggestion and the valid keys.
#[test]
fn unknown_key_gets_suggestion() {
    let toml = r#"
[dispatch]
max_atempts = 4
"#;

    let errors = load_and_validate_str(toml).expect_err("should produce errors");
    let found = errors.iter().any(|e| {
        matches!(e, ConfigError::UnknownKey { key, suggestion, valid_keys, .. } if {
            key == "max_atempts"
                && suggestion.as_deref() == Some("max_attempts")
                && valid_keys.contains("retry_delay_ms")
        })
    });
    assert!(found, "expected UnknownKey for max_atempts, got: {errors:?}");
}

/// Unknown top-level section is rejected.
#[test]
fn unknown_top_level_section_rejected() {
    let err = load_config_from_str("[telegram]\nbot_token = \"x\"\n")
        .expect_err("unknown section should be rejected");
    let err_str = err.to_string();
    assert!(
        err_str.contains("unknown field") || err_str.contains("telegram"),
        "error should mention the unknown field, got: {err_str}"
    );
}

/// A string where a number is expected is an InvalidType diagnostic.
#[test]
fn invalid_type_is_reported() {
    let toml = r#"
[recovery]
tick_interval_secs = "often"
"#;

    let errors = load_and_validate_str(toml).expect_err("should reject invalid type");
    assert!(
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::InvalidType { key, .. } if key.contains("tick_interval_secs"))),
        "got: {errors:?}"
    );
}

/// Semantic validation runs after a successful parse.
#[test]
fn validation_runs_after_parse() {
    let toml = r#"
[dispatch]
max_attempts = 0
"#;

    let errors = load_and_validate_str(toml).expect_err("zero attempts should fail");
    assert!(errors.iter().any(|e| {
        matches!(e, ConfigError::Validation { message } if message.contains("max_attempts"))
    }));
}

/// ConfigError renders through miette with its help text.
#[test]
fn config_error_renders_with_miette() {
    use miette::{Diagnostic, GraphicalReportHandler};

    let error = ConfigError::UnknownKey {
        key: "templat_name".to_string(),
        suggestion: Some("template_name".to_string()),
        valid_keys: "template_name, template_language".to_string(),
        span: None,
        src: None,
    };

    assert!(error.code().is_some());
    let help = error.help().expect("should have help").to_string();
    assert!(help.contains("did you mean `template_name`"), "got: {help}");

    let mut buf = String::new();
    GraphicalReportHandler::new()
        .render_report(&mut buf, &error)
        .expect("should render");
    assert!(buf.contains("templat_name"));
}
