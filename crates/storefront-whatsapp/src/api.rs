// SPDX-FileCopyrightText: 2026 Storefront Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire types for the Graph API `/{phone_number_id}/messages` endpoint.

use serde::{Deserialize, Serialize};
use storefront_core::types::OutboundPayload;

/// Request body for sending one message.
#[derive(Debug, Serialize)]
pub struct SendRequest<'a> {
    pub messaging_product: &'static str,
    pub to: &'a str,
    #[serde(flatten)]
    pub body: MessageBody<'a>,
}

impl<'a> SendRequest<'a> {
    pub fn new(to: &'a str, payload: &'a OutboundPayload) -> Self {
        let body = match payload {
            OutboundPayload::Text(text) => MessageBody::Text {
                text: TextBody { body: text },
            },
            OutboundPayload::Template {
                name,
                language,
                parameters,
            } => {
                let components = if parameters.is_empty() {
                    Vec::new()
                } else {
                    vec![TemplateComponent {
                        kind: "body",
                        parameters: parameters
                            .iter()
                            .map(|text| TemplateParameter { kind: "text", text })
                            .collect(),
                    }]
                };
                MessageBody::Template {
                    template: Template {
                        name,
                        language: TemplateLanguage { code: language },
                        components,
                    },
                }
            }
        };
        Self {
            messaging_product: "whatsapp",
            to,
            body,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageBody<'a> {
    Text { text: TextBody<'a> },
    Template { template: Template<'a> },
}

#[derive(Debug, Serialize)]
pub struct TextBody<'a> {
    pub body: &'a str,
}

#[derive(Debug, Serialize)]
pub struct Template<'a> {
    pub name: &'a str,
    pub language: TemplateLanguage<'a>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<TemplateComponent<'a>>,
}

#[derive(Debug, Serialize)]
pub struct TemplateLanguage<'a> {
    pub code: &'a str,
}

#[derive(Debug, Serialize)]
pub struct TemplateComponent<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub parameters: Vec<TemplateParameter<'a>>,
}

#[derive(Debug, Serialize)]
pub struct TemplateParameter<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub text: &'a str,
}

/// Successful send response. Only the message IDs are read.
#[derive(Debug, Deserialize)]
pub struct SendResponse {
    #[serde(default)]
    pub messages: Vec<SentMessage>,
}

#[derive(Debug, Deserialize)]
pub struct SentMessage {
    pub id: String,
}

/// Error envelope returned on non-2xx responses.
#[derive(Debug, Deserialize)]
pub struct GraphErrorResponse {
    pub error: GraphError,
}

#[derive(Debug, Deserialize)]
pub struct GraphError {
    pub message: String,
    #[serde(default)]
    pub code: Option<i64>,
}
