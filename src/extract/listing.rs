//! Search-results page extraction
//!
//! Search pages are only mined for product identifiers and detail-page
//! links; every other field comes from the detail page itself.

use scraper::{Html, Selector};
use url::Url;

/// A product card discovered on a search-results page
#[derive(Debug, Clone, PartialEq)]
pub struct ProductCard {
    /// Stable external identifier from the card's id attribute
    pub product_id: String,

    /// Absolute URL of the product detail page
    pub url: Url,
}

/// Extracts `(identifier, detail URL)` pairs from a search-results page
///
/// Cards are elements carrying a `data-id` attribute; the detail link is the
/// first `a[href]` descendant, resolved against `base_url`. Cards missing
/// either the identifier or the link are skipped silently.
///
/// # Arguments
///
/// * `html` - The search page body
/// * `base_url` - The page URL, used to resolve relative hrefs
pub fn extract_product_cards(html: &str, base_url: &Url) -> Vec<ProductCard> {
    let document = Html::parse_document(html);

    let card_selector = Selector::parse("div[data-id]").expect("static selector");
    let link_selector = Selector::parse("a[href]").expect("static selector");

    let mut cards = Vec::new();

    for element in document.select(&card_selector) {
        let product_id = match element.value().attr("data-id") {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => continue,
        };

        let href = match element.select(&link_selector).next() {
            Some(anchor) => anchor.value().attr("href").unwrap_or(""),
            None => continue,
        };

        let url = match base_url.join(href.trim()) {
            Ok(url) => url,
            Err(_) => continue,
        };

        cards.push(ProductCard { product_id, url });
    }

    cards
}
