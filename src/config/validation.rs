use crate::config::types::{Config, CrawlConfig, FetchConfig, OutputConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawl_config(&config.crawl)?;
    validate_fetch_config(&config.fetch)?;
    validate_output_config(&config.output)?;
    validate_queries(&config.queries)?;
    Ok(())
}

/// Validates crawl bounds
fn validate_crawl_config(config: &CrawlConfig) -> Result<(), ConfigError> {
    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max-pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    if config.max_items < 1 {
        return Err(ConfigError::Validation(format!(
            "max-items must be >= 1, got {}",
            config.max_items
        )));
    }

    Ok(())
}

/// Validates fetch policy configuration
fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.search_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid search-url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "search-url must be http or https, got '{}'",
            url.scheme()
        )));
    }

    if config.min_delay_ms > config.max_delay_ms {
        return Err(ConfigError::Validation(format!(
            "min-delay-ms ({}) must not exceed max-delay-ms ({})",
            config.min_delay_ms, config.max_delay_ms
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database-path cannot be empty".to_string(),
        ));
    }

    if config.mirror_path.is_empty() {
        return Err(ConfigError::Validation(
            "mirror-path cannot be empty".to_string(),
        ));
    }

    if config.export_path.is_empty() {
        return Err(ConfigError::Validation(
            "export-path cannot be empty".to_string(),
        ));
    }

    if config.commit_every < 1 {
        return Err(ConfigError::Validation(format!(
            "commit-every must be >= 1, got {}",
            config.commit_every
        )));
    }

    if config.mirror_write_every < 1 {
        return Err(ConfigError::Validation(format!(
            "mirror-write-every must be >= 1, got {}",
            config.mirror_write_every
        )));
    }

    Ok(())
}

/// Validates the query list
fn validate_queries(queries: &[String]) -> Result<(), ConfigError> {
    if queries.is_empty() {
        return Err(ConfigError::Validation(
            "queries cannot be empty".to_string(),
        ));
    }

    for query in queries {
        if query.trim().is_empty() {
            return Err(ConfigError::Validation(
                "queries must not contain blank entries".to_string(),
            ));
        }
    }

    Ok(())
}
