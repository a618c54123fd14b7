//! JSON-LD product extraction
//!
//! Detail pages embed one or more `application/ld+json` script blocks whose
//! shape varies: a single object, an array, or an `@graph` wrapper with
//! products nested arbitrarily deep. The walk is a pure structural traversal
//! over the JSON tree; it performs no deduplication (that is the caller's
//! job) and preserves first-seen order.

use scraper::{Html, Selector};
use serde_json::Value;

/// Recursion limit for the JSON-LD walk; adversarial nesting beyond this is
/// ignored rather than risking stack exhaustion.
const MAX_WALK_DEPTH: usize = 64;

/// Extracts every JSON-LD object with `"@type": "Product"` from a page
///
/// Malformed script blocks are skipped, not fatal. Callers treat the first
/// element as authoritative when multiple products exist.
pub fn extract_products(html: &str) -> Vec<Value> {
    let document = Html::parse_document(html);
    let selector =
        Selector::parse(r#"script[type="application/ld+json"]"#).expect("static selector");

    let mut products = Vec::new();

    for script in document.select(&selector) {
        let text: String = script.text().collect();
        let data: Value = match serde_json::from_str(&text) {
            Ok(data) => data,
            Err(e) => {
                tracing::debug!("Skipping malformed JSON-LD block: {}", e);
                continue;
            }
        };

        walk(&data, &mut products, 0);
    }

    products
}

/// Depth-first walk collecting Product objects into the accumulator
fn walk(node: &Value, products: &mut Vec<Value>, depth: usize) {
    if depth > MAX_WALK_DEPTH {
        return;
    }

    match node {
        Value::Object(map) => {
            if map.get("@type").and_then(Value::as_str) == Some("Product") {
                products.push(node.clone());
            }

            for value in map.values() {
                walk(value, products, depth + 1);
            }
        }
        Value::Array(items) => {
            for item in items {
                walk(item, products, depth + 1);
            }
        }
        _ => {}
    }
}
