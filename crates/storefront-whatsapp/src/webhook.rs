// SPDX-FileCopyrightText: 2026 Storefront Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Decoding of WhatsApp Cloud API change notifications.
//!
//! Notifications nest messages as `entry[].changes[].value.messages[]`, with
//! sender display names alongside in `value.contacts[]`. Decoding is lenient
//! at every level: an entry, change, contact, or message that does not match
//! the expected shape is skipped on its own, as is a message without a sender
//! or text body (media, reactions, status callbacks).

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use storefront_core::types::InboundMessage;
use tracing::debug;

#[derive(Debug, Default, Deserialize)]
struct Entry {
    #[serde(default)]
    changes: Vec<Value>,
}

#[derive(Debug, Default, Deserialize)]
struct Change {
    #[serde(default)]
    value: ChangeValue,
}

#[derive(Debug, Default, Deserialize)]
struct ChangeValue {
    #[serde(default)]
    messages: Vec<Value>,
    #[serde(default)]
    contacts: Vec<Value>,
}

#[derive(Debug, Default, Deserialize)]
struct WebhookMessage {
    from: Option<String>,
    text: Option<TextContent>,
}

#[derive(Debug, Default, Deserialize)]
struct TextContent {
    body: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Contact {
    wa_id: Option<String>,
    profile: Option<Profile>,
}

#[derive(Debug, Default, Deserialize)]
struct Profile {
    name: Option<String>,
}

/// Decode one element, logging and dropping it when it has the wrong shape.
fn decode<T: DeserializeOwned>(raw: &Value, what: &str) -> Option<T> {
    match T::deserialize(raw) {
        Ok(item) => Some(item),
        Err(e) => {
            debug!(error = %e, "skipping malformed webhook {what}");
            None
        }
    }
}

fn display_name_for(contacts: &[Contact], sender: &str) -> Option<String> {
    let by_id = contacts.iter().find(|c| c.wa_id.as_deref() == Some(sender));
    let contact = match (by_id, contacts) {
        (Some(c), _) => c,
        (None, [only]) if only.wa_id.is_none() => only,
        _ => return None,
    };
    contact
        .profile
        .as_ref()
        .and_then(|p| p.name.as_deref())
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string)
}

/// Extract the text messages from a webhook body, in delivery order.
pub fn normalize(payload: &Value) -> Vec<InboundMessage> {
    let Some(entries) = payload.get("entry").and_then(Value::as_array) else {
        debug!("webhook payload has no entry array");
        return Vec::new();
    };

    let mut inbound = Vec::new();
    for entry in entries.iter().filter_map(|raw| decode::<Entry>(raw, "entry")) {
        for change in entry
            .changes
            .iter()
            .filter_map(|raw| decode::<Change>(raw, "change"))
        {
            let value = change.value;
            let contacts: Vec<Contact> = value
                .contacts
                .iter()
                .filter_map(|raw| decode(raw, "contact"))
                .collect();
            for message in value
                .messages
                .iter()
                .filter_map(|raw| decode::<WebhookMessage>(raw, "message"))
            {
                let sender = message.from.as_deref().map(str::trim).unwrap_or_default();
                let text = message
                    .text
                    .as_ref()
                    .and_then(|t| t.body.as_deref())
                    .unwrap_or_default();
                if sender.is_empty() || text.trim().is_empty() {
                    debug!("skipping webhook message without sender or text");
                    continue;
                }
                inbound.push(InboundMessage {
                    sender: sender.to_string(),
                    text: text.to_string(),
                    display_name: display_name_for(&contacts, sender),
                });
            }
        }
    }
    inbound
}
