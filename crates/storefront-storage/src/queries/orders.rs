// SPDX-FileCopyrightText: 2026 Storefront Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Order ledger operations.
//!
//! Status changes happen inside a transaction that re-reads the current
//! status, so a concurrent terminal transition cannot be overwritten.

use chrono::{DateTime, Utc};
use rusqlite::{OptionalExtension, params};
use serde_json::json;
use storefront_core::StorefrontError;
use storefront_core::types::{EventType, NewOrder, Order, OrderId, OrderStatus};
use tracing::debug;

use crate::database::{
    Database, decimal_column, enum_column, format_ts, json_column, map_tr_err, ts_column,
};

const ORDER_COLUMNS: &str = "id, customer_id, items, amount, status, created_at, updated_at";

fn row_to_order(row: &rusqlite::Row<'_>) -> rusqlite::Result<Order> {
    Ok(Order {
        id: row.get(0)?,
        customer_id: row.get(1)?,
        items: json_column(row, 2)?,
        total: decimal_column(row, 3)?,
        status: enum_column(row, 4)?,
        created_at: ts_column(row, 5)?,
        updated_at: ts_column(row, 6)?,
    })
}

fn select_order(conn: &rusqlite::Connection, id: OrderId) -> rusqlite::Result<Option<Order>> {
    conn.query_row(
        &format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?1"),
        params![id],
        row_to_order,
    )
    .optional()
}

fn select_status(conn: &rusqlite::Connection, id: OrderId) -> rusqlite::Result<Option<OrderStatus>> {
    conn.query_row(
        "SELECT status FROM orders WHERE id = ?1",
        params![id],
        |row| enum_column(row, 0),
    )
    .optional()
}

/// Insert a new pending order and return the stored row.
///
/// The row is read back so timestamps carry the stored millisecond precision.
pub async fn create_order(db: &Database, order: &NewOrder) -> Result<Order, StorefrontError> {
    let items_json = serde_json::to_string(&order.items).map_err(StorefrontError::storage)?;
    let total = order.total();
    let customer_id = order.customer_id;
    let ts = format_ts(order.created_at);

    db.connection()
        .call(move |conn| -> Result<Order, rusqlite::Error> {
            conn.execute(
                "INSERT INTO orders (customer_id, items, amount, status, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
                params![
                    customer_id,
                    items_json,
                    total.to_string(),
                    OrderStatus::Pending.to_string(),
                    ts,
                ],
            )?;
            select_order(conn, conn.last_insert_rowid())?
                .ok_or(rusqlite::Error::QueryReturnedNoRows)
        })
        .await
        .map_err(map_tr_err)
}

/// Get an order by ID.
pub async fn get_order(db: &Database, id: OrderId) -> Result<Option<Order>, StorefrontError> {
    db.connection()
        .call(move |conn| -> Result<Option<Order>, rusqlite::Error> { select_order(conn, id) })
        .await
        .map_err(map_tr_err)
}

enum Transition {
    Missing,
    Rejected(OrderStatus),
    Applied(Order),
}

/// Move an order along its lifecycle.
///
/// Repeating the current terminal status is a no-op that returns the order
/// unchanged. Any move out of a terminal status is rejected.
pub async fn transition_order(
    db: &Database,
    id: OrderId,
    to: OrderStatus,
    now: DateTime<Utc>,
) -> Result<Order, StorefrontError> {
    let ts = format_ts(now);
    let outcome = db
        .connection()
        .call(move |conn| -> Result<Transition, rusqlite::Error> {
            let tx = conn.transaction()?;
            let Some(from) = select_status(&tx, id)? else {
                return Ok(Transition::Missing);
            };
            if !from.can_transition_to(to) {
                return Ok(Transition::Rejected(from));
            }
            if from != to {
                tx.execute(
                    "UPDATE orders SET status = ?1, updated_at = ?2 WHERE id = ?3",
                    params![to.to_string(), ts, id],
                )?;
            }
            let order = select_order(&tx, id)?;
            tx.commit()?;
            Ok(order.map_or(Transition::Missing, Transition::Applied))
        })
        .await
        .map_err(map_tr_err)?;

    match outcome {
        Transition::Applied(order) => {
            debug!(order_id = id, status = %order.status, "order transitioned");
            Ok(order)
        }
        Transition::Rejected(from) => Err(StorefrontError::InvalidTransition {
            order_id: id,
            from,
            to,
        }),
        Transition::Missing => Err(StorefrontError::NotFound {
            entity: "order",
            id: id.to_string(),
        }),
    }
}

/// Force an order to `Abandoned` and append a `ManualAbandon` event atomically.
///
/// Returns `false` without writing anything when the order does not exist or
/// is already completed.
pub async fn manual_abandon(
    db: &Database,
    id: OrderId,
    now: DateTime<Utc>,
) -> Result<bool, StorefrontError> {
    let ts = format_ts(now);
    let metadata = json!({ "order_id": id, "triggered_by": "admin_panel" }).to_string();
    db.connection()
        .call(move |conn| -> Result<bool, rusqlite::Error> {
            let tx = conn.transaction()?;
            let row: Option<(i64, OrderStatus)> = tx
                .query_row(
                    "SELECT customer_id, status FROM orders WHERE id = ?1",
                    params![id],
                    |row| Ok((row.get(0)?, enum_column(row, 1)?)),
                )
                .optional()?;
            let Some((customer_id, status)) = row else {
                return Ok(false);
            };
            if status == OrderStatus::Completed {
                return Ok(false);
            }
            tx.execute(
                "UPDATE orders SET status = ?1, updated_at = ?2 WHERE id = ?3",
                params![OrderStatus::Abandoned.to_string(), ts, id],
            )?;
            tx.execute(
                "INSERT INTO automation_events (customer_id, order_id, event_type, metadata, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    customer_id,
                    id,
                    EventType::ManualAbandon.to_string(),
                    metadata,
                    ts,
                ],
            )?;
            tx.commit()?;
            Ok(true)
        })
        .await
        .map_err(map_tr_err)
}
