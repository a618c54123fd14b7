//! Crawler module for page fetching and crawl orchestration
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with user-agent rotation and soft-block retry
//! - The politeness throttle (serial fetching, jittered delays)
//! - Product-identifier deduplication
//! - The per-query crawl state machine

mod coordinator;
mod dedup;
mod fetcher;
mod throttle;

pub use coordinator::{run_crawl, Coordinator, Flow};
pub use dedup::Deduplicator;
pub use fetcher::{FetchClient, FetchedPage};
pub use throttle::Throttle;

use crate::config::Config;
use crate::Result;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Open the persistence layer (database, mirror, export sink)
/// 2. Crawl every configured query through the state machine
/// 3. Flush and close all persistence targets
///
/// # Arguments
///
/// * `config` - The crawler configuration
///
/// # Returns
///
/// * `Ok(())` - Crawl completed
/// * `Err(MercatoError)` - Crawl failed at startup or shutdown
pub async fn crawl(config: Config) -> Result<()> {
    run_crawl(config).await
}
