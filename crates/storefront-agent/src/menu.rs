// SPDX-FileCopyrightText: 2026 Storefront Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Menu rendering for the greeting reply.

use rust_decimal::Decimal;
use storefront_core::types::CatalogItem;

/// Reply sent when the merchant has not published any items.
pub const EMPTY_MENU_REPLY: &str =
    "Our menu is empty right now. Please check back a little later!";

/// Format a price with its currency prefix and two decimal places.
pub fn format_price(currency_symbol: &str, amount: Decimal) -> String {
    format!("{currency_symbol}{:.2}", amount.round_dp(2))
}

/// Render the catalog grouped by category.
///
/// Categories appear in the order their first item appears in the catalog;
/// items keep catalog order within a category.
pub fn format_menu(catalog: &[CatalogItem], currency_symbol: &str) -> String {
    if catalog.is_empty() {
        return EMPTY_MENU_REPLY.to_string();
    }

    let mut groups: Vec<(&str, Vec<&CatalogItem>)> = Vec::new();
    for item in catalog {
        let category = item.category();
        match groups.iter_mut().find(|(name, _)| *name == category) {
            Some((_, items)) => items.push(item),
            None => groups.push((category, vec![item])),
        }
    }

    let mut out = String::from("📋 *Our Menu*\n");
    for (category, items) in groups {
        out.push_str(&format!("\n*{category}*\n"));
        for item in items {
            out.push_str(&format!(
                "• {} - {}\n",
                item.name,
                format_price(currency_symbol, item.price)
            ));
        }
    }
    out.push_str("\nReply with the item and quantity you'd like to order.");
    out
}
