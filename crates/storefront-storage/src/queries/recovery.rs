// SPDX-FileCopyrightText: 2026 Storefront Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Recovery eligibility queries.

use chrono::{DateTime, Utc};
use rusqlite::{OptionalExtension, params};
use storefront_core::StorefrontError;
use storefront_core::types::{EventType, LineItem, OrderId, OrderStatus, RecoveryCandidate};

use crate::database::{Database, format_ts, json_column, map_tr_err, ts_column};

const CANDIDATE_SELECT: &str = "SELECT o.id, o.customer_id, c.phone, c.name, o.items, o.created_at
     FROM orders o
     JOIN customers c ON c.id = o.customer_id";

fn row_to_candidate(row: &rusqlite::Row<'_>) -> rusqlite::Result<RecoveryCandidate> {
    let name: Option<String> = row.get(3)?;
    let items: Vec<LineItem> = json_column(row, 4)?;
    Ok(RecoveryCandidate {
        order_id: row.get(0)?,
        customer_id: row.get(1)?,
        phone: row.get(2)?,
        customer_name: name.filter(|n| !n.trim().is_empty()),
        first_item: items.into_iter().next().map(|item| item.name),
        created_at: ts_column(row, 5)?,
    })
}

/// Pending orders that are due a reminder, oldest first.
///
/// An order qualifies when it was created before `cutoff`, has no
/// `reminder_sent` event, and the customer has not written since it was
/// created. Evaluated as one statement, so it sees a single snapshot.
pub async fn recovery_candidates(
    db: &Database,
    cutoff: DateTime<Utc>,
) -> Result<Vec<RecoveryCandidate>, StorefrontError> {
    let cutoff = format_ts(cutoff);
    db.connection()
        .call(move |conn| -> Result<Vec<RecoveryCandidate>, rusqlite::Error> {
            let mut stmt = conn.prepare(&format!(
                "{CANDIDATE_SELECT}
                 WHERE o.status = ?1
                   AND o.created_at < ?2
                   AND NOT EXISTS (
                       SELECT 1 FROM automation_events ae
                       WHERE ae.order_id = o.id
                         AND ae.customer_id = o.customer_id
                         AND ae.event_type = ?3
                   )
                   AND NOT EXISTS (
                       SELECT 1 FROM messages m
                       WHERE m.customer_id = o.customer_id
                         AND m.direction = 'in'
                         AND m.created_at > o.created_at
                   )
                 ORDER BY o.created_at ASC, o.id ASC"
            ))?;
            let rows = stmt.query_map(
                params![
                    OrderStatus::Pending.to_string(),
                    cutoff,
                    EventType::ReminderSent.to_string(),
                ],
                row_to_candidate,
            )?;
            let mut candidates = Vec::new();
            for row in rows {
                candidates.push(row?);
            }
            Ok(candidates)
        })
        .await
        .map_err(map_tr_err)
}

/// Reminder details for one order regardless of its eligibility.
pub async fn recovery_candidate(
    db: &Database,
    order_id: OrderId,
) -> Result<Option<RecoveryCandidate>, StorefrontError> {
    db.connection()
        .call(move |conn| -> Result<Option<RecoveryCandidate>, rusqlite::Error> {
            conn.query_row(
                &format!("{CANDIDATE_SELECT} WHERE o.id = ?1"),
                params![order_id],
                row_to_candidate,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}
