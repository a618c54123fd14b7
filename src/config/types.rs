use serde::Deserialize;

/// Main configuration structure for Mercato
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawl: CrawlConfig,
    pub fetch: FetchConfig,
    pub output: OutputConfig,
    /// Search queries to crawl, one state-machine run per query
    #[serde(default)]
    pub queries: Vec<String>,
}

/// Crawl bounds applied to every query
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlConfig {
    /// Maximum number of search-result pages to visit per query
    #[serde(rename = "max-pages")]
    pub max_pages: u32,

    /// Maximum number of product records to emit per query
    #[serde(rename = "max-items")]
    pub max_items: u32,
}

/// Fetch policy configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    /// Base URL of the search endpoint (query string is appended)
    #[serde(rename = "search-url")]
    pub search_url: String,

    /// Base delay between requests (milliseconds), jittered per request
    #[serde(rename = "base-delay-ms", default = "default_base_delay")]
    pub base_delay_ms: u64,

    /// Floor for the adaptive throttle (milliseconds)
    #[serde(rename = "min-delay-ms", default = "default_min_delay")]
    pub min_delay_ms: u64,

    /// Ceiling for the adaptive throttle (milliseconds)
    #[serde(rename = "max-delay-ms", default = "default_max_delay")]
    pub max_delay_ms: u64,

    /// Extra attempts after a soft-block response (429/503)
    #[serde(rename = "max-retries", default = "default_max_retries")]
    pub max_retries: u32,

    /// Backfill missing record fields from the framework-embedded JSON blob
    #[serde(rename = "use-embedded-fallback", default)]
    pub use_embedded_fallback: bool,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,

    /// Path to the JSON-array mirror file
    #[serde(rename = "mirror-path")]
    pub mirror_path: String,

    /// Path to the JSONL export feed
    #[serde(rename = "export-path")]
    pub export_path: String,

    /// Database writes accumulated before a transaction commit
    #[serde(rename = "commit-every", default = "default_commit_every")]
    pub commit_every: u32,

    /// Records between mirror file rewrites (1 = rewrite on every record)
    #[serde(rename = "mirror-write-every", default = "default_mirror_write_every")]
    pub mirror_write_every: u32,
}

fn default_base_delay() -> u64 {
    4500
}

fn default_min_delay() -> u64 {
    3000
}

fn default_max_delay() -> u64 {
    15000
}

fn default_max_retries() -> u32 {
    2
}

fn default_commit_every() -> u32 {
    10
}

fn default_mirror_write_every() -> u32 {
    5
}
