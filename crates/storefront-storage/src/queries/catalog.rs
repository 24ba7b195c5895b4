// SPDX-FileCopyrightText: 2026 Storefront Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Merchant catalog operations.

use rusqlite::params;
use storefront_core::StorefrontError;
use storefront_core::types::CatalogItem;

use crate::database::{Database, decimal_column, map_tr_err};

/// The catalog in menu order.
pub async fn load_catalog(db: &Database) -> Result<Vec<CatalogItem>, StorefrontError> {
    db.connection()
        .call(|conn| -> Result<Vec<CatalogItem>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT name, price, category FROM catalog_items ORDER BY position ASC, id ASC",
            )?;
            let rows = stmt.query_map([], |row| {
                Ok(CatalogItem {
                    name: row.get(0)?,
                    price: decimal_column(row, 1)?,
                    category: row.get(2)?,
                })
            })?;
            let mut items = Vec::new();
            for row in rows {
                items.push(row?);
            }
            Ok(items)
        })
        .await
        .map_err(map_tr_err)
}

/// Replace the whole catalog in one transaction.
pub async fn replace_catalog(db: &Database, items: &[CatalogItem]) -> Result<(), StorefrontError> {
    let items = items.to_vec();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            let tx = conn.transaction()?;
            tx.execute("DELETE FROM catalog_items", [])?;
            {
                let mut stmt = tx.prepare(
                    "INSERT INTO catalog_items (position, name, price, category)
                     VALUES (?1, ?2, ?3, ?4)",
                )?;
                for (position, item) in items.iter().enumerate() {
                    stmt.execute(params![
                        position as i64,
                        item.name,
                        item.price.to_string(),
                        item.category,
                    ])?;
                }
            }
            tx.commit()
        })
        .await
        .map_err(map_tr_err)
}
