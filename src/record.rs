//! Product record types and field normalization
//!
//! A [`ProductRecord`] accumulates fields during extraction and is immutable
//! once it reaches the pipeline. Price and rating values arrive in wildly
//! inconsistent shapes (strings with currency symbols, bare numbers), so
//! normalization lives here next to the type.

use chrono::{FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Offset for `scraped_at` timestamps (UTC+05:30)
const SCRAPE_TZ_SECONDS: i32 = 5 * 3600 + 30 * 60;

/// A single extracted product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    /// External identifier, primary key across persistence
    pub product_id: String,

    pub title: Option<String>,

    /// Price in the smallest currency unit (fractional part truncated)
    pub price: Option<i64>,

    pub rating: Option<f64>,

    pub product_url: String,

    /// The originating search query
    pub category: String,

    /// 1-based search-results page the product was discovered on
    pub page: u32,

    /// ISO-8601 timestamp in UTC+05:30, assigned at emission time
    pub scraped_at: String,
}

/// Configuration for one crawl run of the state machine
#[derive(Debug, Clone)]
pub struct CrawlQuery {
    pub query: String,
    pub max_pages: u32,
    pub max_items: u32,
}

/// Returns the current time as an ISO-8601 string in UTC+05:30
pub fn scraped_at_now() -> String {
    let tz = FixedOffset::east_opt(SCRAPE_TZ_SECONDS).expect("valid fixed offset");
    Utc::now().with_timezone(&tz).to_rfc3339()
}

/// Normalizes a raw price value to the smallest currency unit
///
/// Strips every character that is not a digit or decimal point, parses the
/// remainder as a float, and truncates the fractional part. A value with no
/// digits yields `None`, never zero.
///
/// # Example
///
/// ```
/// use mercato::record::parse_price;
/// use serde_json::json;
///
/// assert_eq!(parse_price(&json!("₹1,499")), Some(1499));
/// assert_eq!(parse_price(&json!("999.50")), Some(999));
/// assert_eq!(parse_price(&json!("—")), None);
/// ```
pub fn parse_price(raw: &Value) -> Option<i64> {
    let text = match raw {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };

    let digits: String = text.chars().filter(|c| c.is_ascii_digit() || *c == '.').collect();
    if digits.is_empty() {
        return None;
    }

    digits.parse::<f64>().ok().map(|v| v.trunc() as i64)
}

/// Normalizes a raw rating value to a float
///
/// Accepts both string and numeric JSON values; anything unparseable yields
/// `None`.
pub fn parse_rating(raw: &Value) -> Option<f64> {
    match raw {
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_price_with_currency_symbol() {
        assert_eq!(parse_price(&json!("₹1,499")), Some(1499));
    }

    #[test]
    fn test_parse_price_truncates_fraction() {
        assert_eq!(parse_price(&json!("999.50")), Some(999));
        assert_eq!(parse_price(&json!(999.99)), Some(999));
    }

    #[test]
    fn test_parse_price_plain_number() {
        assert_eq!(parse_price(&json!(1499)), Some(1499));
        assert_eq!(parse_price(&json!("1499")), Some(1499));
    }

    #[test]
    fn test_parse_price_no_digits_is_absent() {
        assert_eq!(parse_price(&json!("—")), None);
        assert_eq!(parse_price(&json!("")), None);
        assert_eq!(parse_price(&json!("free")), None);
    }

    #[test]
    fn test_parse_price_non_scalar_is_absent() {
        assert_eq!(parse_price(&json!(null)), None);
        assert_eq!(parse_price(&json!({"amount": 10})), None);
    }

    #[test]
    fn test_parse_rating_string_and_number() {
        assert_eq!(parse_rating(&json!("4.2")), Some(4.2));
        assert_eq!(parse_rating(&json!(4.2)), Some(4.2));
    }

    #[test]
    fn test_parse_rating_garbage_is_absent() {
        assert_eq!(parse_rating(&json!("n/a")), None);
        assert_eq!(parse_rating(&json!(null)), None);
    }

    #[test]
    fn test_scraped_at_carries_ist_offset() {
        let ts = scraped_at_now();
        assert!(ts.ends_with("+05:30"), "unexpected timestamp: {}", ts);
    }

    #[test]
    fn test_record_serde_round_trip() {
        let record = ProductRecord {
            product_id: "ABC123".to_string(),
            title: Some("Widget".to_string()),
            price: Some(1499),
            rating: Some(4.2),
            product_url: "https://shop.example.com/p/abc123".to_string(),
            category: "widgets".to_string(),
            page: 1,
            scraped_at: scraped_at_now(),
        };

        let json = serde_json::to_string(&record).unwrap();
        let back: ProductRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record, back);
    }
}
