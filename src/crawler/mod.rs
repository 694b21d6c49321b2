//! Crawler module for catalogue page fetching and product extraction
//!
//! This module contains the core scraping logic, including:
//! - HTTP fetching with timeouts and optional proxy
//! - Structural matchers for product cards and fields
//! - Product extraction from page markup
//! - Overall traversal coordination

mod coordinator;
mod extractor;
mod fetcher;
pub mod matcher;
mod report;

pub use coordinator::Coordinator;
pub use extractor::Extractor;
pub use fetcher::{build_http_client, check_reachable, fetch_page, FetchedPage, TransportError};
pub use matcher::{ElementMatcher, Heuristics};
pub use report::{PageFailure, StoreFailure, TraversalReport};

use crate::config::Config;
use crate::storage::open_storage;
use crate::ScrapeError;
use std::path::Path;

/// Runs a complete traversal against the configured database
///
/// This is the main entry point for a scrape. It will:
/// 1. Open (or create) the product database
/// 2. Build the HTTP client
/// 3. Check that the catalogue root is reachable
/// 4. Fetch every page, extract products and store the new ones
///
/// # Arguments
///
/// * `config` - The scraper configuration
///
/// # Returns
///
/// * `Ok(TraversalReport)` - Traversal ran; individual page and record
///   failures are listed in the report
/// * `Err(ScrapeError)` - Traversal could not start
///
/// # Example
///
/// ```no_run
/// use catalogue_scraper::config::load_config;
/// use catalogue_scraper::crawler::traverse;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("config.toml"))?;
/// let report = traverse(&config).await?;
/// println!("{} new products", report.inserted_count);
/// # Ok(())
/// # }
/// ```
pub async fn traverse(config: &Config) -> Result<TraversalReport, ScrapeError> {
    let storage = open_storage(
        Path::new(&config.output.database_path),
        config.output.identity_scheme,
    )?;
    let mut coordinator = Coordinator::new(config.clone(), storage)?;
    coordinator.run().await
}
