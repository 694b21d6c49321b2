//! Traversal coordinator - main scrape orchestration logic
//!
//! This module contains the page loop that coordinates all aspects of a
//! scrape, including:
//! - The pre-flight reachability check
//! - Fetching pages, sequentially or through a bounded worker pool
//! - Segmenting pages into fragments and extracting records
//! - Insert-if-absent storage and outcome tallies
//! - Run bookkeeping
//!
//! A failed page or a failed store write is recorded in the report and the
//! run carries on.

use crate::config::Config;
use crate::crawler::extractor::Extractor;
use crate::crawler::fetcher::{build_http_client, check_reachable, fetch_page, FetchedPage};
use crate::crawler::report::{PageFailure, StoreFailure, TraversalReport};
use crate::crawler::TransportError;
use crate::storage::{ProductStore, UpsertOutcome};
use crate::url::page_urls;
use crate::ScrapeError;
use chrono::Utc;
use reqwest::Client;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Outcome of fetching one page
type PageFetch = (u32, String, Result<FetchedPage, TransportError>);

/// Main traversal coordinator
pub struct Coordinator<S: ProductStore> {
    config: Config,
    client: Client,
    extractor: Extractor,
    store: S,
}

impl<S: ProductStore> Coordinator<S> {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The scraper configuration
    /// * `store` - Where extracted records are deduplicated and persisted
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(ScrapeError)` - Failed to build the HTTP client
    pub fn new(config: Config, store: S) -> Result<Self, ScrapeError> {
        let client = build_http_client(&config.scraper, &config.user_agent)?;

        Ok(Self {
            config,
            client,
            extractor: Extractor::default(),
            store,
        })
    }

    /// Replaces the default extraction heuristics
    pub fn with_extractor(mut self, extractor: Extractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Traverses the configured catalogue
    pub async fn run(&mut self) -> Result<TraversalReport, ScrapeError> {
        let base_url = self.config.scraper.base_url.clone();
        let num_pages = self.config.scraper.num_pages;
        self.traverse(&base_url, num_pages).await
    }

    /// Traverses pages `1..=num_pages` of the catalogue at `base_url`
    ///
    /// Fails only before the page loop starts: on a page count of zero or a
    /// failed pre-flight check. Everything after that ends up in the report.
    pub async fn traverse(
        &mut self,
        base_url: &str,
        num_pages: u32,
    ) -> Result<TraversalReport, ScrapeError> {
        if num_pages < 1 {
            return Err(ScrapeError::InvalidPageCount(num_pages));
        }

        if self.config.scraper.preflight {
            check_reachable(&self.client, base_url).await?;
            tracing::debug!("Catalogue root {} is reachable", base_url);
        }

        let mut report = TraversalReport::new(base_url, num_pages);
        report.run_id = match self.store.begin_run(base_url, num_pages) {
            Ok(run_id) => Some(run_id),
            Err(e) => {
                tracing::warn!("Failed to record run start: {}", e);
                None
            }
        };

        tracing::info!(
            "Starting traversal of {} ({} pages, {} concurrent)",
            base_url,
            num_pages,
            self.config.scraper.max_concurrent_pages
        );

        let pages = page_urls(base_url, num_pages);
        if self.config.scraper.max_concurrent_pages <= 1 {
            for (index, url) in pages {
                let result = fetch_page(&self.client, &url).await;
                self.process_page(&mut report, index, url, result);
            }
        } else {
            for (index, url, result) in self.fetch_concurrently(pages).await {
                self.process_page(&mut report, index, url, result);
            }
        }

        report.finished_at = Utc::now();

        if let Some(run_id) = report.run_id {
            if let Err(e) = self.store.finish_run(run_id, &report.totals()) {
                tracing::warn!("Failed to record run {} totals: {}", run_id, e);
            }
        }

        tracing::info!(
            "Traversal finished: {} products, {} inserted, {} existing, {}/{} pages fetched in {}ms",
            report.total_products(),
            report.inserted_count,
            report.existing_count,
            report.pages_fetched,
            report.pages_requested,
            report.duration().num_milliseconds()
        );

        Ok(report)
    }

    /// Fetches all pages through a worker pool bounded by `max_concurrent_pages`
    ///
    /// Results come back in page order regardless of completion order.
    async fn fetch_concurrently(&self, pages: Vec<(u32, String)>) -> Vec<PageFetch> {
        let semaphore = Arc::new(Semaphore::new(
            self.config.scraper.max_concurrent_pages as usize,
        ));
        let mut set = JoinSet::new();

        for (index, url) in pages.iter().cloned() {
            let client = self.client.clone();
            let semaphore = Arc::clone(&semaphore);
            set.spawn(async move {
                let _permit = semaphore.acquire_owned().await;
                let result = fetch_page(&client, &url).await;
                (index, result)
            });
        }

        let mut completed = BTreeMap::new();
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((index, result)) => {
                    completed.insert(index, result);
                }
                Err(e) => tracing::error!("Page fetch task failed: {}", e),
            }
        }

        pages
            .into_iter()
            .map(|(index, url)| {
                let result = completed.remove(&index).unwrap_or_else(|| {
                    Err(TransportError::Other("fetch task aborted".to_string()))
                });
                (index, url, result)
            })
            .collect()
    }

    /// Extracts and stores the products of one page, or records its failure
    fn process_page(
        &mut self,
        report: &mut TraversalReport,
        index: u32,
        url: String,
        result: Result<FetchedPage, TransportError>,
    ) {
        let page = match result {
            Ok(page) => page,
            Err(error) => {
                tracing::warn!("Failed to fetch page {} ({}): {}", index, url, error);
                report.page_failures.push(PageFailure {
                    page: index,
                    url,
                    error,
                });
                return;
            }
        };

        report.pages_fetched += 1;
        tracing::debug!(
            "Fetched page {} from {} (HTTP {})",
            index,
            page.final_url,
            page.status_code
        );

        let records = self.extractor.extract_page(&page.body);
        tracing::info!("Number of products for page {}: {}", index, records.len());

        for record in records {
            match self.store.upsert(&record) {
                Ok(UpsertOutcome::Inserted(id)) => {
                    tracing::debug!("Inserted {} ({})", id, record.title);
                    report.inserted_count += 1;
                }
                Ok(UpsertOutcome::Existing(id)) => {
                    tracing::debug!("Already stored {} ({})", id, record.title);
                    report.existing_count += 1;
                }
                Err(e) => {
                    let id = record.content_id(self.store.identity_scheme());
                    tracing::warn!("Failed to store {} ({}): {}", id, record.title, e);
                    report.store_failures.push(StoreFailure {
                        id,
                        record: record.clone(),
                        error: e.to_string(),
                    });
                }
            }
            report.records.push(record);
        }
    }
}
