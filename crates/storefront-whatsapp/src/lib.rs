// SPDX-FileCopyrightText: 2026 Storefront Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! WhatsApp Cloud API adapter for the Storefront commerce channel.
//!
//! Implements [`MessagingTransport`] over the Graph API messages endpoint
//! and decodes inbound webhook notifications into [`InboundMessage`]s.
//!
//! [`InboundMessage`]: storefront_core::types::InboundMessage

pub mod api;
pub mod webhook;

use std::time::Duration;

use async_trait::async_trait;
use storefront_config::model::WhatsAppConfig;
use storefront_core::error::StorefrontError;
use storefront_core::traits::{MessagingTransport, PluginAdapter};
use storefront_core::types::{AdapterType, HealthStatus, OutboundPayload};
use tracing::{debug, warn};

use crate::api::{GraphErrorResponse, SendRequest, SendResponse};

/// WhatsApp Cloud API transport.
///
/// Each [`send`](MessagingTransport::send) is exactly one HTTP request;
/// retrying is the caller's concern. Without an access token and phone
/// number ID every send fails, which keeps the rest of the storefront
/// running against an unconfigured account.
#[derive(Debug, Clone)]
pub struct WhatsAppTransport {
    client: reqwest::Client,
    config: WhatsAppConfig,
}

impl WhatsAppTransport {
    pub fn new(config: WhatsAppConfig) -> Result<Self, StorefrontError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| StorefrontError::Transport {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;
        if !Self::has_credentials(&config) {
            warn!("whatsapp credentials not configured; outbound messages will fail");
        }
        Ok(Self { client, config })
    }

    fn has_credentials(config: &WhatsAppConfig) -> bool {
        let set = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        set(&config.access_token) && set(&config.phone_number_id)
    }

    fn credentials(&self) -> Result<(&str, &str), StorefrontError> {
        match (
            self.config.access_token.as_deref(),
            self.config.phone_number_id.as_deref(),
        ) {
            (Some(token), Some(phone_id)) if Self::has_credentials(&self.config) => {
                Ok((token, phone_id))
            }
            _ => Err(StorefrontError::transport(
                "whatsapp.access_token and whatsapp.phone_number_id must be set",
            )),
        }
    }

    fn messages_url(&self, phone_number_id: &str) -> String {
        format!(
            "{}/{}/messages",
            self.config.api_base_url.trim_end_matches('/'),
            phone_number_id
        )
    }
}

#[async_trait]
impl PluginAdapter for WhatsAppTransport {
    fn name(&self) -> &str {
        "whatsapp"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Transport
    }

    async fn health_check(&self) -> Result<HealthStatus, StorefrontError> {
        if Self::has_credentials(&self.config) {
            Ok(HealthStatus::Healthy)
        } else {
            Ok(HealthStatus::Degraded(
                "whatsapp credentials not configured".into(),
            ))
        }
    }

    async fn shutdown(&self) -> Result<(), StorefrontError> {
        Ok(())
    }
}

#[async_trait]
impl MessagingTransport for WhatsAppTransport {
    async fn send(
        &self,
        recipient: &str,
        payload: &OutboundPayload,
    ) -> Result<(), StorefrontError> {
        let (token, phone_id) = self.credentials()?;
        let url = self.messages_url(phone_id);

        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(&SendRequest::new(recipient, payload))
            .send()
            .await
            .map_err(|e| StorefrontError::Transport {
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| StorefrontError::Transport {
            message: format!("failed to read response body: {e}"),
            source: Some(Box::new(e)),
        })?;

        if !status.is_success() {
            let message = match serde_json::from_str::<GraphErrorResponse>(&body) {
                Ok(err) => match err.error.code {
                    Some(code) => format!("WhatsApp API error {code}: {}", err.error.message),
                    None => format!("WhatsApp API error: {}", err.error.message),
                },
                Err(_) => format!("WhatsApp API returned {status}: {body}"),
            };
            return Err(StorefrontError::transport(message));
        }

        let sent: SendResponse =
            serde_json::from_str(&body).map_err(|e| StorefrontError::Transport {
                message: format!("failed to parse send response: {e}"),
                source: Some(Box::new(e)),
            })?;
        debug!(
            recipient,
            message_id = sent.messages.first().map(|m| m.id.as_str()).unwrap_or_default(),
            "whatsapp message accepted"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(base_url: &str) -> WhatsAppConfig {
        WhatsAppConfig {
            access_token: Some("test-token".into()),
            phone_number_id: Some("1234567890".into()),
            api_base_url: base_url.to_string(),
            request_timeout_secs: 5,
        }
    }

    fn accepted() -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "messaging_product": "whatsapp",
            "contacts": [{ "input": "919800000001", "wa_id": "919800000001" }],
            "messages": [{ "id": "wamid.HBgM" }]
        }))
    }

    #[tokio::test]
    async fn text_message_posts_with_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/1234567890/messages"))
            .and(header("authorization", "Bearer test-token"))
            .and(body_partial_json(serde_json::json!({
                "messaging_product": "whatsapp",
                "to": "919800000001",
                "text": { "body": "hello" }
            })))
            .respond_with(accepted())
            .expect(1)
            .mount(&server)
            .await;

        let transport = WhatsAppTransport::new(config(&server.uri())).unwrap();
        transport
            .send("919800000001", &OutboundPayload::Text("hello".into()))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn template_message_carries_parameters() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/1234567890/messages"))
            .and(body_partial_json(serde_json::json!({
                "type": "template",
                "template": { "name": "abandoned_cart", "language": { "code": "en_US" } }
            })))
            .respond_with(accepted())
            .expect(1)
            .mount(&server)
            .await;

        let transport = WhatsAppTransport::new(config(&server.uri())).unwrap();
        let payload = OutboundPayload::Template {
            name: "abandoned_cart".into(),
            language: "en_US".into(),
            parameters: vec!["Valued Customer".into(), "Veg Burger".into()],
        };
        transport.send("919800000001", &payload).await.unwrap();
    }

    #[tokio::test]
    async fn api_error_is_a_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "error": { "message": "Invalid OAuth access token.", "code": 190 }
            })))
            .mount(&server)
            .await;

        let transport = WhatsAppTransport::new(config(&server.uri())).unwrap();
        let err = transport
            .send("919800000001", &OutboundPayload::Text("hello".into()))
            .await
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("190"), "got: {msg}");
        assert!(msg.contains("Invalid OAuth"), "got: {msg}");
    }

    #[tokio::test]
    async fn malformed_success_body_is_a_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let transport = WhatsAppTransport::new(config(&server.uri())).unwrap();
        let result = transport
            .send("919800000001", &OutboundPayload::Text("hello".into()))
            .await;
        assert!(matches!(result, Err(StorefrontError::Transport { .. })));
    }

    #[tokio::test]
    async fn missing_credentials_fail_without_a_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(accepted())
            .expect(0)
            .mount(&server)
            .await;

        let mut cfg = config(&server.uri());
        cfg.access_token = None;
        let transport = WhatsAppTransport::new(cfg).unwrap();

        assert!(matches!(
            transport.health_check().await.unwrap(),
            HealthStatus::Degraded(_)
        ));
        let result = transport
            .send("919800000001", &OutboundPayload::Text("hello".into()))
            .await;
        assert!(result.is_err());
    }
}
