// SPDX-FileCopyrightText: 2026 Storefront Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reporting aggregates.
//!
//! Amounts are stored as decimal text, so sums are taken in Rust rather
//! than with SQLite's floating-point `SUM`.

use chrono::{DateTime, Utc};
use rusqlite::params;
use storefront_core::StorefrontError;
use storefront_core::types::{DailyStats, EventType, OrderStatus};

use crate::database::{Database, decimal_column, enum_column, format_ts, map_tr_err};

/// Order figures for orders created at or after `since`.
///
/// Orders still pending count as abandoned alongside explicitly abandoned
/// ones. An order counts as recovered when it is completed and a reminder
/// was successfully sent for it.
pub async fn daily_stats(db: &Database, since: DateTime<Utc>) -> Result<DailyStats, StorefrontError> {
    let since = format_ts(since);
    db.connection()
        .call(move |conn| -> Result<DailyStats, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT o.status, o.amount,
                        EXISTS(
                            SELECT 1 FROM automation_events ae
                            WHERE ae.order_id = o.id AND ae.event_type = ?2
                        )
                 FROM orders o
                 WHERE o.created_at >= ?1",
            )?;
            let rows = stmt.query_map(
                params![since, EventType::ReminderSent.to_string()],
                |row| {
                    let status: OrderStatus = enum_column(row, 0)?;
                    let amount = decimal_column(row, 1)?;
                    let reminded: bool = row.get(2)?;
                    Ok((status, amount, reminded))
                },
            )?;

            let mut stats = DailyStats::default();
            for row in rows {
                let (status, amount, reminded) = row?;
                stats.new_orders += 1;
                match status {
                    OrderStatus::Completed => {
                        stats.total_revenue += amount;
                        if reminded {
                            stats.recovered_count += 1;
                        }
                    }
                    OrderStatus::Abandoned | OrderStatus::Pending => {
                        stats.abandoned_count += 1;
                        stats.lost_revenue += amount;
                    }
                }
            }
            Ok(stats)
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use serde_json::json;
    use storefront_core::types::{LineItem, NewEvent, NewOrder};

    use super::*;
    use crate::queries::customers::upsert_customer;
    use crate::queries::events::record_event;
    use crate::queries::orders::{create_order, manual_abandon, transition_order};
    use crate::queries::test_support::{at, open_temp_db};

    async fn order(db: &Database, customer_id: i64, cents: i64, hour: u32) -> i64 {
        create_order(
            db,
            &NewOrder {
                customer_id,
                items: vec![LineItem {
                    name: "Thali".into(),
                    unit_price: Decimal::new(cents, 2),
                    quantity: 1,
                }],
                created_at: at(hour, 0),
            },
        )
        .await
        .unwrap()
        .id
    }

    #[tokio::test]
    async fn stats_split_revenue_by_outcome() {
        let (db, _dir) = open_temp_db().await;
        let customer = upsert_customer(&db, "919800000050", None, at(1, 0))
            .await
            .unwrap();

        // Before the window.
        let old = order(&db, customer.id, 100_00, 1).await;
        transition_order(&db, old, OrderStatus::Completed, at(2, 0))
            .await
            .unwrap();

        let plain = order(&db, customer.id, 250_50, 9).await;
        transition_order(&db, plain, OrderStatus::Completed, at(9, 5))
            .await
            .unwrap();

        let recovered = order(&db, customer.id, 120_00, 10).await;
        record_event(
            &db,
            &NewEvent {
                customer_id: customer.id,
                order_id: recovered,
                event_type: EventType::ReminderSent,
                metadata: json!({ "order_id": recovered, "status": "success" }),
                created_at: at(10, 20),
            },
        )
        .await
        .unwrap();
        transition_order(&db, recovered, OrderStatus::Completed, at(10, 40))
            .await
            .unwrap();

        let lost = order(&db, customer.id, 80_25, 11).await;
        assert!(manual_abandon(&db, lost, at(11, 30)).await.unwrap());

        // Still pending, counted as at risk.
        order(&db, customer.id, 10_00, 12).await;

        let stats = daily_stats(&db, at(8, 0)).await.unwrap();
        assert_eq!(stats.new_orders, 4);
        assert_eq!(stats.total_revenue, Decimal::new(370_50, 2));
        assert_eq!(stats.abandoned_count, 2);
        assert_eq!(stats.lost_revenue, Decimal::new(90_25, 2));
        assert_eq!(stats.recovered_count, 1);
    }

    #[tokio::test]
    async fn empty_window_is_all_zero() {
        let (db, _dir) = open_temp_db().await;
        let stats = daily_stats(&db, at(0, 0)).await.unwrap();
        assert_eq!(stats, DailyStats::default());
    }
}
