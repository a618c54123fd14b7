//! Mercato main entry point
//!
//! Command-line interface for the Mercato product crawler.

use anyhow::Context;
use clap::Parser;
use mercato::config::load_config;
use mercato::crawler::crawl;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Mercato: an e-commerce product crawler
///
/// Mercato crawls a search-results flow one request at a time, extracts
/// structured product records from detail pages, and persists them to
/// SQLite, a JSON-array mirror, and a JSONL export feed.
#[derive(Parser, Debug)]
#[command(name = "mercato")]
#[command(version)]
#[command(about = "An e-commerce product crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = load_config(&cli.config)
        .with_context(|| format!("Failed to load configuration {}", cli.config.display()))?;

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    tracing::info!(
        "Crawling {} queries, up to {} pages / {} items each",
        config.queries.len(),
        config.crawl.max_pages,
        config.crawl.max_items
    );

    match crawl(config).await {
        Ok(()) => {
            tracing::info!("Crawl completed");
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("mercato=info,warn"),
            1 => EnvFilter::new("mercato=debug,info"),
            2 => EnvFilter::new("mercato=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: validates config and shows the crawl plan
fn handle_dry_run(config: &mercato::config::Config) {
    println!("=== Mercato Dry Run ===\n");

    println!("Crawl:");
    println!("  Max pages per query: {}", config.crawl.max_pages);
    println!("  Max items per query: {}", config.crawl.max_items);

    println!("\nFetch policy:");
    println!("  Search URL: {}", config.fetch.search_url);
    println!("  Base delay: {}ms (jittered)", config.fetch.base_delay_ms);
    println!(
        "  Adaptive delay bounds: {}ms - {}ms",
        config.fetch.min_delay_ms, config.fetch.max_delay_ms
    );
    println!("  Soft-block retries: {}", config.fetch.max_retries);
    println!(
        "  Embedded-state fallback: {}",
        config.fetch.use_embedded_fallback
    );

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);
    println!("  Mirror: {}", config.output.mirror_path);
    println!("  Export feed: {}", config.output.export_path);
    println!("  Commit every: {} writes", config.output.commit_every);
    println!(
        "  Mirror rewrite every: {} records",
        config.output.mirror_write_every
    );

    println!("\nQueries ({}):", config.queries.len());
    for query in &config.queries {
        println!("  - {}", query);
    }

    println!("\n✓ Configuration is valid");
}
