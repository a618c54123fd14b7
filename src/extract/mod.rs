//! Structured-data extraction
//!
//! Two independent strategies, used at different stages of the crawl:
//! - listing: identifier + detail-link pairs from search-results cards
//! - jsonld: the authoritative Product objects on detail pages
//!
//! plus an optional embedded-state fallback that backfills fields JSON-LD
//! did not provide.

mod embedded;
mod jsonld;
mod listing;

pub use embedded::{backfill, extract_embedded_product};
pub use jsonld::extract_products;
pub use listing::{extract_product_cards, ProductCard};
