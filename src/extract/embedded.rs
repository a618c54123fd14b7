//! Framework-embedded state fallback
//!
//! Some detail pages ship their full page state as a JSON document inside a
//! `script#__NEXT_DATA__` block. This is only consulted as a secondary
//! source: a missing path segment means "no data", and fields already
//! populated on the record are never overwritten.

use crate::record::{parse_price, parse_rating, ProductRecord};
use scraper::{Html, Selector};
use serde_json::Value;

/// Property path from the document root to the product details object
const PRODUCT_PATH: [&str; 6] = [
    "props",
    "pageProps",
    "initialState",
    "productPage",
    "productDetails",
    "value",
];

/// Locates the embedded product object on a detail page
///
/// Returns `None` when the script block is absent, its JSON is malformed, or
/// any segment of the fixed property path is missing.
pub fn extract_embedded_product(html: &str) -> Option<Value> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("script#__NEXT_DATA__").expect("static selector");

    let text: String = document.select(&selector).next()?.text().collect();
    let data: Value = serde_json::from_str(&text).ok()?;

    let mut node = &data;
    for segment in PRODUCT_PATH {
        node = node.get(segment)?;
    }

    Some(node.clone())
}

/// Backfills missing record fields from the embedded product object
///
/// Only fields absent from the record are filled; already-populated fields
/// are left untouched.
pub fn backfill(record: &mut ProductRecord, product: &Value) {
    if record.title.is_none() {
        record.title = product
            .get("titles")
            .and_then(|t| t.get("title"))
            .and_then(Value::as_str)
            .map(str::to_string);
    }

    if record.price.is_none() {
        if let Some(raw) = product
            .get("pricing")
            .and_then(|p| p.get("finalPrice"))
            .and_then(|p| p.get("value"))
        {
            record.price = parse_price(raw);
        }
    }

    if record.rating.is_none() {
        if let Some(raw) = product.get("rating").and_then(|r| r.get("average")) {
            record.rating = parse_rating(raw);
        }
    }
}
