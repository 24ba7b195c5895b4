// SPDX-FileCopyrightText: 2026 Storefront Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fuzzy product resolution and quantity extraction.
//!
//! Similarity is the Sørensen–Dice coefficient over character bigrams with
//! whitespace ignored, computed on lower-cased text.

use storefront_core::types::CatalogItem;

/// A candidate must score strictly above this to be accepted.
pub const ACCEPT_THRESHOLD: f64 = 0.5;

/// Tokens shorter than this (in characters) are ignored.
pub const MIN_TOKEN_LEN: usize = 3;

/// A catalog item picked for a message, with the winning score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProductMatch<'a> {
    pub item: &'a CatalogItem,
    pub score: f64,
}

/// Lower-cased words of `message` with digits and punctuation removed.
pub fn tokens(message: &str) -> Vec<String> {
    let stripped: String = message
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphabetic() || c.is_whitespace())
        .collect();
    stripped
        .split_whitespace()
        .filter(|t| t.chars().count() >= MIN_TOKEN_LEN)
        .map(str::to_string)
        .collect()
}

/// Pick the catalog item that best matches any token of `message`.
///
/// Ties keep the earliest candidate, scanning tokens in message order and
/// items in catalog order.
pub fn resolve_product<'a>(message: &str, catalog: &'a [CatalogItem]) -> Option<ProductMatch<'a>> {
    let names: Vec<String> = catalog.iter().map(|c| c.name.to_lowercase()).collect();
    let mut best: Option<ProductMatch<'a>> = None;

    for token in tokens(message) {
        for (item, name) in catalog.iter().zip(&names) {
            let score = strsim::sorensen_dice(&token, name);
            if score <= ACCEPT_THRESHOLD {
                continue;
            }
            if best.is_none_or(|b| score > b.score) {
                best = Some(ProductMatch { item, score });
            }
        }
    }
    best
}

/// The first run of decimal digits in `message`, or 1 when there is none or
/// it is not a positive number that fits.
pub fn extract_quantity(message: &str) -> u32 {
    let digits: String = message
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(char::is_ascii_digit)
        .collect();
    match digits.parse::<u32>() {
        Ok(n) if n > 0 => n,
        _ => 1,
    }
}
