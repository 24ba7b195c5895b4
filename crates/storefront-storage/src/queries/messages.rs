// SPDX-FileCopyrightText: 2026 Storefront Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation history operations.

use chrono::{DateTime, Utc};
use rusqlite::params;
use storefront_core::StorefrontError;
use storefront_core::types::{CustomerId, Direction, Message};

use crate::database::{Database, enum_column, format_ts, map_tr_err, ts_column};

/// Append one message to a customer's history.
pub async fn insert_message(
    db: &Database,
    customer_id: CustomerId,
    direction: Direction,
    body: &str,
    now: DateTime<Utc>,
) -> Result<Message, StorefrontError> {
    let body = body.to_string();
    let created_at = format_ts(now);
    db.connection()
        .call(move |conn| -> Result<Message, rusqlite::Error> {
            conn.execute(
                "INSERT INTO messages (customer_id, direction, body, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![customer_id, direction.to_string(), body, created_at],
            )?;
            Ok(Message {
                id: conn.last_insert_rowid(),
                customer_id,
                direction,
                body,
                created_at: now,
            })
        })
        .await
        .map_err(map_tr_err)
}

/// Messages for a customer in chronological order.
pub async fn messages_for_customer(
    db: &Database,
    customer_id: CustomerId,
) -> Result<Vec<Message>, StorefrontError> {
    db.connection()
        .call(move |conn| -> Result<Vec<Message>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT id, customer_id, direction, body, created_at
                 FROM messages WHERE customer_id = ?1
                 ORDER BY created_at ASC, id ASC",
            )?;
            let rows = stmt.query_map(params![customer_id], |row| {
                Ok(Message {
                    id: row.get(0)?,
                    customer_id: row.get(1)?,
                    direction: enum_column(row, 2)?,
                    body: row.get(3)?,
                    created_at: ts_column(row, 4)?,
                })
            })?;
            let mut messages = Vec::new();
            for row in rows {
                messages.push(row?);
            }
            Ok(messages)
        })
        .await
        .map_err(map_tr_err)
}
