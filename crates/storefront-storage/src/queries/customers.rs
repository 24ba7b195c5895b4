// SPDX-FileCopyrightText: 2026 Storefront Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Customer book operations.

use chrono::{DateTime, Utc};
use rusqlite::{OptionalExtension, params};
use storefront_core::StorefrontError;
use storefront_core::types::{Customer, CustomerId, UNKNOWN_CUSTOMER_NAME};

use crate::database::{Database, format_ts, map_tr_err, ts_column};

const CUSTOMER_COLUMNS: &str = "id, phone, name, last_contacted, created_at";

fn row_to_customer(row: &rusqlite::Row<'_>) -> rusqlite::Result<Customer> {
    Ok(Customer {
        id: row.get(0)?,
        phone: row.get(1)?,
        name: row.get(2)?,
        last_contacted: ts_column(row, 3)?,
        created_at: ts_column(row, 4)?,
    })
}

/// Create the customer on first contact, otherwise refresh `last_contacted`.
///
/// A blank or missing `name` never overwrites a stored one; a new customer
/// without a name is recorded as [`UNKNOWN_CUSTOMER_NAME`].
pub async fn upsert_customer(
    db: &Database,
    phone: &str,
    name: Option<&str>,
    now: DateTime<Utc>,
) -> Result<Customer, StorefrontError> {
    let phone = phone.to_string();
    let name = name
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string);
    let now = format_ts(now);
    db.connection()
        .call(move |conn| -> Result<Customer, rusqlite::Error> {
            conn.query_row(
                &format!(
                    "INSERT INTO customers (phone, name, last_contacted, created_at)
                     VALUES (?1, COALESCE(?2, ?3), ?4, ?4)
                     ON CONFLICT(phone) DO UPDATE SET
                         last_contacted = excluded.last_contacted,
                         name = COALESCE(?2, customers.name)
                     RETURNING {CUSTOMER_COLUMNS}"
                ),
                params![phone, name, UNKNOWN_CUSTOMER_NAME, now],
                row_to_customer,
            )
        })
        .await
        .map_err(map_tr_err)
}

/// Get a customer by ID.
pub async fn get_customer(
    db: &Database,
    id: CustomerId,
) -> Result<Option<Customer>, StorefrontError> {
    db.connection()
        .call(move |conn| -> Result<Option<Customer>, rusqlite::Error> {
            conn.query_row(
                &format!("SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = ?1"),
                params![id],
                row_to_customer,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::test_support::{at, open_temp_db};

    #[tokio::test]
    async fn first_contact_creates_customer() {
        let (db, _dir) = open_temp_db().await;
        let customer = upsert_customer(&db, "919800000001", Some("Asha"), at(9, 0))
            .await
            .unwrap();
        assert_eq!(customer.phone, "919800000001");
        assert_eq!(customer.name, "Asha");
        assert_eq!(customer.created_at, at(9, 0));
        assert_eq!(customer.last_contacted, at(9, 0));
    }

    #[tokio::test]
    async fn missing_name_is_recorded_as_unknown() {
        let (db, _dir) = open_temp_db().await;
        let customer = upsert_customer(&db, "919800000002", None, at(9, 0))
            .await
            .unwrap();
        assert_eq!(customer.name, UNKNOWN_CUSTOMER_NAME);
    }

    #[tokio::test]
    async fn repeat_contact_keeps_id_and_refreshes_timestamp() {
        let (db, _dir) = open_temp_db().await;
        let first = upsert_customer(&db, "919800000003", Some("Ravi"), at(9, 0))
            .await
            .unwrap();
        let second = upsert_customer(&db, "919800000003", None, at(10, 30))
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.name, "Ravi", "absent name must not overwrite");
        assert_eq!(second.created_at, at(9, 0));
        assert_eq!(second.last_contacted, at(10, 30));
    }

    #[tokio::test]
    async fn get_customer_returns_none_for_unknown_id() {
        let (db, _dir) = open_temp_db().await;
        assert!(get_customer(&db, 404).await.unwrap().is_none());
    }
}
