// SPDX-FileCopyrightText: 2026 Storefront Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Lookup order: `/etc/storefront/storefront.toml` < `~/.config/storefront/storefront.toml`
//! < `./storefront.toml`, with `STOREFRONT_*` environment variables on top.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::StorefrontConfig;

/// Top-level sections that environment variables may address.
const SECTIONS: &[&str] = &[
    "agent",
    "storage",
    "whatsapp",
    "dispatch",
    "recovery",
    "storefront",
    "webhook",
];

pub(crate) const SYSTEM_CONFIG_PATH: &str = "/etc/storefront/storefront.toml";
pub(crate) const LOCAL_CONFIG_PATH: &str = "storefront.toml";

pub(crate) fn user_config_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("storefront/storefront.toml"))
        .unwrap_or_default()
}

/// Load configuration from the standard hierarchy with env var overrides.
pub fn load_config() -> Result<StorefrontConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no files, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<StorefrontConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(StorefrontConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<StorefrontConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(StorefrontConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the layered Figment before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(StorefrontConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path()))
        .merge(Toml::file(LOCAL_CONFIG_PATH))
        .merge(env_provider())
}

/// Map `STOREFRONT_<SECTION>_<KEY>` onto `section.key`.
///
/// Only the first underscore after a known section name becomes a dot, so
/// `STOREFRONT_WHATSAPP_ACCESS_TOKEN` lands on `whatsapp.access_token`.
fn env_provider() -> Env {
    Env::prefixed("STOREFRONT_").map(|key| map_env_key(key.as_str()).into())
}

fn map_env_key(key: &str) -> String {
    for section in SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|r| r.strip_prefix('_'))
        {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}
