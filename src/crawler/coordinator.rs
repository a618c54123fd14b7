//! Crawl coordinator - the per-query state machine
//!
//! This module drives the two-stage crawl for each configured query:
//! - Listing stage: fetch search-results pages 1..=max_pages and discover
//!   product cards
//! - Detail stage: fetch each discovered product page, extract the JSON-LD
//!   Product, assemble a record, and hand it to the pipeline
//!
//! The emitted-item counter gates the run: a cap reached before a listing
//! fetch stops issuing further pages; a cap reached at a card or after an
//! emission stops the whole run via an explicit [`Flow::StopRun`] result
//! checked by the page loop. Cap exhaustion is a clean termination, not an
//! error.

use crate::config::Config;
use crate::crawler::dedup::Deduplicator;
use crate::crawler::fetcher::FetchClient;
use crate::crawler::throttle::Throttle;
use crate::extract::{
    backfill, extract_embedded_product, extract_product_cards, extract_products, ProductCard,
};
use crate::pipeline::Pipeline;
use crate::record::{parse_price, parse_rating, scraped_at_now, CrawlQuery, ProductRecord};
use crate::Result;
use serde_json::Value;
use std::time::Instant;
use url::Url;

/// Control-flow result of one unit of crawl work
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Keep crawling
    Continue,

    /// Item cap reached: abort the entire run for this query
    StopRun,
}

/// Main crawler coordinator structure
pub struct Coordinator {
    config: Config,
    client: FetchClient,
    throttle: Throttle,
    pipeline: Pipeline,
    search_url: Url,
}

impl Coordinator {
    /// Creates a coordinator and starts its pipeline
    ///
    /// Opens the relational store, loads the JSON mirror, and opens the
    /// export sink. Fails only on unrecoverable startup problems.
    pub fn new(config: Config) -> Result<Self> {
        let client = FetchClient::new(&config.fetch)?;
        let throttle = Throttle::new(&config.fetch);
        let search_url = Url::parse(&config.fetch.search_url)?;

        let mut pipeline = Pipeline::new(&config.output)?;
        pipeline.start()?;

        Ok(Self {
            config,
            client,
            throttle,
            pipeline,
            search_url,
        })
    }

    /// Runs every configured query, then stops the pipeline
    ///
    /// Pipeline shutdown flushes pending database commits, forces a final
    /// mirror rewrite, and closes the export sink, so a cap-terminated run
    /// leaves both stores valid and complete.
    pub async fn run(&mut self) -> Result<()> {
        let queries: Vec<CrawlQuery> = self
            .config
            .queries
            .iter()
            .map(|q| CrawlQuery {
                query: q.clone(),
                max_pages: self.config.crawl.max_pages,
                max_items: self.config.crawl.max_items,
            })
            .collect();

        for query in &queries {
            self.run_query(query).await;
        }

        self.pipeline.stop()?;
        Ok(())
    }

    /// Runs the state machine for a single query
    ///
    /// Fetch and parse failures are logged and skipped; nothing below the
    /// cap terminates the query early.
    async fn run_query(&mut self, query: &CrawlQuery) {
        tracing::info!("Starting crawl for query '{}'", query.query);

        let mut dedup = Deduplicator::new();
        let mut emitted: u32 = 0;

        'pages: for page in 1..=query.max_pages {
            if emitted >= query.max_items {
                tracing::info!(
                    "Reached max items ({}), no further pages for '{}'",
                    query.max_items,
                    query.query
                );
                break;
            }

            let page_url = match self.search_page_url(&query.query, page) {
                Ok(url) => url,
                Err(e) => {
                    tracing::error!("Failed to build search URL for page {}: {}", page, e);
                    continue;
                }
            };

            self.throttle.wait().await;

            let started = Instant::now();
            let fetched = match self.client.fetch(page_url.as_str()).await {
                Ok(f) => f,
                Err(e) => {
                    tracing::error!("Failed to fetch search page {}: {}", page, e);
                    continue;
                }
            };
            self.throttle.observe_latency(started.elapsed());

            if !fetched.is_success() {
                tracing::warn!(
                    "Search page {} returned HTTP {}, skipping",
                    page,
                    fetched.status.as_u16()
                );
                continue;
            }

            let cards = extract_product_cards(&fetched.body, &page_url);
            if cards.is_empty() {
                tracing::info!("No products found on page {}", page);
                continue;
            }

            for card in &cards {
                match self
                    .process_card(query, page, card, &mut dedup, &mut emitted)
                    .await
                {
                    Flow::Continue => {}
                    Flow::StopRun => {
                        tracing::info!(
                            "Reached max items ({}), stopping crawl for '{}'",
                            query.max_items,
                            query.query
                        );
                        break 'pages;
                    }
                }
            }
        }

        tracing::info!(
            "Query '{}' finished with {} records emitted",
            query.query,
            emitted
        );
    }

    /// Handles one discovered card: dedup, detail fetch, extraction, emission
    async fn process_card(
        &mut self,
        query: &CrawlQuery,
        page: u32,
        card: &ProductCard,
        dedup: &mut Deduplicator,
        emitted: &mut u32,
    ) -> Flow {
        if *emitted >= query.max_items {
            return Flow::StopRun;
        }

        if !dedup.try_schedule(&card.product_id) {
            tracing::debug!("Skipping already scheduled product {}", card.product_id);
            return Flow::Continue;
        }

        self.throttle.wait().await;

        let started = Instant::now();
        let fetched = match self.client.fetch(card.url.as_str()).await {
            Ok(f) => f,
            Err(e) => {
                tracing::error!("Failed to fetch product page {}: {}", card.url, e);
                return Flow::Continue;
            }
        };
        self.throttle.observe_latency(started.elapsed());

        if !fetched.is_success() {
            tracing::warn!(
                "Product page {} returned HTTP {}, skipping",
                card.url,
                fetched.status.as_u16()
            );
            return Flow::Continue;
        }

        let products = extract_products(&fetched.body);
        let Some(product) = products.first() else {
            tracing::warn!("No JSON-LD Product found: {}", fetched.final_url);
            return Flow::Continue;
        };

        if !dedup.try_emit(&card.product_id) {
            return Flow::Continue;
        }

        let mut record = build_record(&card.product_id, product, &fetched.final_url, query, page);

        if self.config.fetch.use_embedded_fallback && record_is_partial(&record) {
            if let Some(embedded) = extract_embedded_product(&fetched.body) {
                backfill(&mut record, &embedded);
            }
        }

        *emitted += 1;
        self.pipeline.process(record);

        if *emitted >= query.max_items {
            Flow::StopRun
        } else {
            Flow::Continue
        }
    }

    /// Builds a search-results URL for the given query and 1-based page
    fn search_page_url(&self, query: &str, page: u32) -> Result<Url> {
        let mut url = self.search_url.clone();
        url.query_pairs_mut()
            .clear()
            .append_pair("q", query)
            .append_pair("page", &page.to_string());
        Ok(url)
    }
}

/// Assembles a record from the authoritative JSON-LD Product object
fn build_record(
    product_id: &str,
    product: &Value,
    fetched_url: &str,
    query: &CrawlQuery,
    page: u32,
) -> ProductRecord {
    let title = product
        .get("name")
        .and_then(Value::as_str)
        .map(str::to_string);

    let product_url = product
        .get("url")
        .and_then(Value::as_str)
        .unwrap_or(fetched_url)
        .to_string();

    let price = product
        .get("offers")
        .and_then(|o| o.get("price"))
        .and_then(|raw| parse_price(raw));

    let rating = product
        .get("aggregateRating")
        .and_then(|r| r.get("ratingValue"))
        .and_then(|raw| parse_rating(raw));

    ProductRecord {
        product_id: product_id.to_string(),
        title,
        price,
        rating,
        product_url,
        category: query.query.clone(),
        page,
        scraped_at: scraped_at_now(),
    }
}

/// Whether any backfillable field is still missing
fn record_is_partial(record: &ProductRecord) -> bool {
    record.title.is_none() || record.price.is_none() || record.rating.is_none()
}

/// Runs the main crawl operation
///
/// # Arguments
///
/// * `config` - The crawler configuration
///
/// # Returns
///
/// * `Ok(())` - Crawl completed (including clean cap-terminated runs)
/// * `Err(MercatoError)` - Unrecoverable startup or shutdown failure
pub async fn run_crawl(config: Config) -> Result<()> {
    let mut coordinator = Coordinator::new(config)?;
    coordinator.run().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn test_query() -> CrawlQuery {
        CrawlQuery {
            query: "mobiles".to_string(),
            max_pages: 3,
            max_items: 10,
        }
    }

    #[test]
    fn test_build_record_full_product() {
        let product = json!({
            "@type": "Product",
            "name": "X",
            "url": "https://shop.example.com/p/x",
            "offers": {"price": "999.50"},
            "aggregateRating": {"ratingValue": "4.2"}
        });

        let record = build_record(
            "PID001",
            &product,
            "https://shop.example.com/p/x?src=search",
            &test_query(),
            2,
        );

        assert_eq!(record.product_id, "PID001");
        assert_eq!(record.title.as_deref(), Some("X"));
        assert_eq!(record.price, Some(999));
        assert_eq!(record.rating, Some(4.2));
        assert_eq!(record.product_url, "https://shop.example.com/p/x");
        assert_eq!(record.category, "mobiles");
        assert_eq!(record.page, 2);
    }

    #[test]
    fn test_build_record_falls_back_to_fetched_url() {
        let product = json!({"@type": "Product", "name": "X"});
        let record = build_record(
            "PID001",
            &product,
            "https://shop.example.com/p/x",
            &test_query(),
            1,
        );
        assert_eq!(record.product_url, "https://shop.example.com/p/x");
        assert_eq!(record.price, None);
        assert_eq!(record.rating, None);
    }

    #[test]
    fn test_record_is_partial() {
        let product = json!({"@type": "Product", "name": "X"});
        let record = build_record("P", &product, "https://e.com/p", &test_query(), 1);
        assert!(record_is_partial(&record));

        let full = json!({
            "@type": "Product",
            "name": "X",
            "offers": {"price": "10"},
            "aggregateRating": {"ratingValue": "4.0"}
        });
        let record = build_record("P", &full, "https://e.com/p", &test_query(), 1);
        assert!(!record_is_partial(&record));
    }
}
