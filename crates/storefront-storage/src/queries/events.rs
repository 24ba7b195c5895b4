// SPDX-FileCopyrightText: 2026 Storefront Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Automation event log operations.
//!
//! The log is append-only. A partial unique index allows at most one
//! `reminder_sent` row per order; duplicate inserts are skipped silently.

use rusqlite::params;
use storefront_core::StorefrontError;
use storefront_core::types::{AutomationEvent, EventType, NewEvent, OrderId};

use crate::database::{Database, enum_column, format_ts, json_column, map_tr_err, ts_column};

/// Append an event. Returns the new row ID, or `None` when a second
/// `reminder_sent` for the same order was skipped.
pub async fn record_event(db: &Database, event: &NewEvent) -> Result<Option<i64>, StorefrontError> {
    let customer_id = event.customer_id;
    let order_id = event.order_id;
    let event_type = event.event_type.to_string();
    let metadata = event.metadata.to_string();
    let created_at = format_ts(event.created_at);
    db.connection()
        .call(move |conn| -> Result<Option<i64>, rusqlite::Error> {
            let inserted = conn.execute(
                "INSERT OR IGNORE INTO automation_events
                     (customer_id, order_id, event_type, metadata, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![customer_id, order_id, event_type, metadata, created_at],
            )?;
            Ok((inserted > 0).then(|| conn.last_insert_rowid()))
        })
        .await
        .map_err(map_tr_err)
}

/// Whether a successful reminder has already been logged for the order.
pub async fn has_reminder_sent(db: &Database, order_id: OrderId) -> Result<bool, StorefrontError> {
    db.connection()
        .call(move |conn| -> Result<bool, rusqlite::Error> {
            conn.query_row(
                "SELECT EXISTS(
                     SELECT 1 FROM automation_events
                     WHERE order_id = ?1 AND event_type = ?2
                 )",
                params![order_id, EventType::ReminderSent.to_string()],
                |row| row.get(0),
            )
        })
        .await
        .map_err(map_tr_err)
}

/// Events for an order in the order they were appended.
pub async fn events_for_order(
    db: &Database,
    order_id: OrderId,
) -> Result<Vec<AutomationEvent>, StorefrontError> {
    db.connection()
        .call(move |conn| -> Result<Vec<AutomationEvent>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT id, customer_id, order_id, event_type, metadata, created_at
                 FROM automation_events WHERE order_id = ?1
                 ORDER BY id ASC",
            )?;
            let rows = stmt.query_map(params![order_id], |row| {
                Ok(AutomationEvent {
                    id: row.get(0)?,
                    customer_id: row.get(1)?,
                    order_id: row.get(2)?,
                    event_type: enum_column(row, 3)?,
                    metadata: json_column(row, 4)?,
                    created_at: ts_column(row, 5)?,
                })
            })?;
            let mut events = Vec::new();
            for row in rows {
                events.push(row?);
            }
            Ok(events)
        })
        .await
        .map_err(map_tr_err)
}
