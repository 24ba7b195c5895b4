// SPDX-FileCopyrightText: 2026 Storefront Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inbound webhook receiver built on axum.
//!
//! Routes:
//! - GET /health: storage liveness
//! - GET /webhook: provider subscription handshake
//! - POST /webhook: change notifications carrying customer messages

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use storefront_agent::MessageInterpreter;
use storefront_config::model::WebhookConfig;
use storefront_core::{HealthStatus, PluginAdapter, StorageAdapter, StorefrontError};
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};

/// Shared state for request handlers.
#[derive(Clone)]
pub struct WebhookState {
    pub interpreter: Arc<MessageInterpreter>,
    pub storage: Arc<dyn StorageAdapter>,
    /// Expected `hub.verify_token`; `None` refuses every handshake.
    pub verify_token: Option<String>,
}

/// Query string of the subscription handshake.
#[derive(Debug, Deserialize)]
pub struct VerifyParams {
    #[serde(rename = "hub.mode")]
    pub mode: Option<String>,
    #[serde(rename = "hub.verify_token")]
    pub verify_token: Option<String>,
    #[serde(rename = "hub.challenge")]
    pub challenge: Option<String>,
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub storage: String,
}

pub fn router(state: WebhookState) -> Router {
    Router::new()
        .route("/health", get(get_health))
        .route("/webhook", get(verify_webhook).post(receive_webhook))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until `cancel` fires.
pub async fn start_server(
    config: &WebhookConfig,
    state: WebhookState,
    cancel: CancellationToken,
) -> Result<(), StorefrontError> {
    let addr = format!("{}:{}", config.bind_address, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| StorefrontError::Transport {
            message: format!("failed to bind webhook receiver to {addr}: {e}"),
            source: Some(Box::new(e)),
        })?;

    info!("webhook receiver listening on {addr}");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await
        .map_err(|e| StorefrontError::Transport {
            message: format!("webhook receiver error: {e}"),
            source: Some(Box::new(e)),
        })
}

/// GET /health
pub async fn get_health(State(state): State<WebhookState>) -> Response {
    let (code, status, storage) = match state.storage.health_check().await {
        Ok(HealthStatus::Healthy) => (StatusCode::OK, "ok", "healthy".to_string()),
        Ok(HealthStatus::Degraded(reason)) => (StatusCode::OK, "degraded", reason),
        Ok(HealthStatus::Unhealthy(reason)) => (StatusCode::SERVICE_UNAVAILABLE, "unhealthy", reason),
        Err(e) => (StatusCode::SERVICE_UNAVAILABLE, "unhealthy", e.to_string()),
    };
    let body = HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        storage,
    };
    (code, Json(body)).into_response()
}

/// GET /webhook
pub async fn verify_webhook(
    State(state): State<WebhookState>,
    Query(params): Query<VerifyParams>,
) -> Response {
    let expected = state.verify_token.as_deref();
    let subscribed = params.mode.as_deref() == Some("subscribe");
    match (expected, params.verify_token.as_deref(), params.challenge) {
        (Some(expected), Some(given), Some(challenge)) if subscribed && expected == given => {
            info!("webhook subscription verified");
            (StatusCode::OK, challenge).into_response()
        }
        _ => {
            warn!(mode = ?params.mode, "webhook verification refused");
            StatusCode::FORBIDDEN.into_response()
        }
    }
}

/// POST /webhook
///
/// Always 200: a malformed or partially failing delivery is logged, not
/// bounced back to the provider.
pub async fn receive_webhook(State(state): State<WebhookState>, body: Bytes) -> StatusCode {
    let payload: serde_json::Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(e) => {
            warn!(error = %e, "ignoring non-JSON webhook body");
            return StatusCode::OK;
        }
    };

    let messages = storefront_whatsapp::webhook::normalize(&payload);
    if messages.is_empty() {
        debug!("webhook carried no customer messages");
        return StatusCode::OK;
    }

    for inbound in &messages {
        match state.interpreter.handle_inbound(inbound).await {
            Ok(outcome) => debug!(
                phone = %inbound.sender,
                order_id = outcome.order.as_ref().map(|o| o.id),
                delivered = outcome.delivered,
                "message handled"
            ),
            Err(e) => error!(phone = %inbound.sender, error = %e, "failed to handle message"),
        }
    }
    StatusCode::OK
}

#[cfg(test)]
mod tests {
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use storefront_agent::{DispatchClient, RetryPolicy};
    use storefront_test_utils::TestHarness;
    use tower::ServiceExt;

    use super::*;

    fn state(harness: &TestHarness, verify_token: Option<&str>) -> WebhookState {
        let dispatch = Arc::new(DispatchClient::new(
            harness.transport.clone(),
            RetryPolicy::from(&harness.config.dispatch),
        ));
        WebhookState {
            interpreter: Arc::new(MessageInterpreter::new(
                harness.storage.clone(),
                dispatch,
                "₹",
            )),
            storage: harness.storage.clone(),
            verify_token: verify_token.map(str::to_string),
        }
    }

    fn notification(messages: serde_json::Value) -> String {
        serde_json::json!({
            "object": "whatsapp_business_account",
            "entry": [{
                "changes": [{
                    "field": "messages",
                    "value": {
                        "contacts": [{ "wa_id": "919822200001", "profile": { "name": "Dev" } }],
                        "messages": messages
                    }
                }]
            }]
        })
        .to_string()
    }

    fn post(body: impl Into<Body>) -> Request<Body> {
        Request::post("/webhook")
            .header("content-type", "application/json")
            .body(body.into())
            .unwrap()
    }

    #[tokio::test]
    async fn health_reports_storage() {
        let harness = TestHarness::new().await.unwrap();
        let response = router(state(&harness, None))
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), 1024).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn handshake_echoes_challenge() {
        let harness = TestHarness::new().await.unwrap();
        let app = router(state(&harness, Some("s3cret")));

        let ok = app
            .clone()
            .oneshot(
                Request::get("/webhook?hub.mode=subscribe&hub.verify_token=s3cret&hub.challenge=42")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(ok.status(), StatusCode::OK);
        assert_eq!(&to_bytes(ok.into_body(), 64).await.unwrap()[..], b"42");

        let wrong = app
            .oneshot(
                Request::get("/webhook?hub.mode=subscribe&hub.verify_token=nope&hub.challenge=42")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(wrong.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn handshake_refused_without_configured_token() {
        let harness = TestHarness::new().await.unwrap();
        let response = router(state(&harness, None))
            .oneshot(
                Request::get("/webhook?hub.mode=subscribe&hub.verify_token=&hub.challenge=1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn text_message_is_interpreted() {
        let harness = TestHarness::new().await.unwrap();
        let body = notification(serde_json::json!([{
            "from": "919822200001",
            "type": "text",
            "text": { "body": "2 veg burger" }
        }]));

        let response = router(state(&harness, None)).oneshot(post(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let texts = harness.transport.delivered_texts().await;
        assert_eq!(texts.len(), 1);
        assert!(texts[0].contains("2 x Veg Burger"));
    }

    #[tokio::test]
    async fn entries_without_text_are_skipped() {
        let harness = TestHarness::new().await.unwrap();
        let body = notification(serde_json::json!([
            { "from": "919822200001", "type": "image", "image": { "id": "x" } },
            { "from": "919822200001", "type": "text", "text": { "body": "menu" } }
        ]));

        let response = router(state(&harness, None)).oneshot(post(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(harness.transport.attempt_count().await, 1);
    }

    #[tokio::test]
    async fn malformed_body_still_gets_200() {
        let harness = TestHarness::new().await.unwrap();
        let response = router(state(&harness, None))
            .oneshot(post("not json"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(harness.transport.attempt_count().await, 0);
    }
}
