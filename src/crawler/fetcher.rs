//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the scraper, including:
//! - Building the HTTP client with user agent, timeouts and proxy
//! - GET requests for catalogue pages
//! - The pre-flight reachability check for the catalogue root
//! - Transport error classification
//!
//! No retries happen here. A failed fetch is reported once and the caller
//! decides what to do with it.

use crate::config::{ScraperConfig, UserAgentConfig};
use crate::url::parse_base_url;
use crate::ScrapeError;
use reqwest::{redirect::Policy, Client, Proxy};
use thiserror::Error;

/// Maximum number of redirects followed for a single page
const MAX_REDIRECTS: usize = 10;

/// A page fetched with a success status
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// URL after redirects
    pub final_url: String,
    /// HTTP status code
    pub status_code: u16,
    /// Page body content
    pub body: String,
}

/// Why a page could not be fetched
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("HTTP {0}")]
    Status(u16),

    #[error("Request timeout")]
    Timeout,

    #[error("Connection failed: {0}")]
    Connect(String),

    #[error("Failed to read body: {0}")]
    Body(String),

    #[error("{0}")]
    Other(String),
}

impl TransportError {
    fn from_reqwest(error: &reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout
        } else if error.is_connect() {
            Self::Connect(error.to_string())
        } else if error.is_body() || error.is_decode() {
            Self::Body(error.to_string())
        } else {
            Self::Other(error.to_string())
        }
    }
}

/// Builds an HTTP client with proper configuration
///
/// The proxy, if configured, is applied to both `http` and `https` requests.
///
/// # Arguments
///
/// * `scraper` - Timeouts and proxy
/// * `user_agent` - The user agent configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client (e.g. unusable proxy)
///
/// # Example
///
/// ```no_run
/// use catalogue_scraper::config::load_config;
/// use catalogue_scraper::crawler::build_http_client;
/// use std::path::Path;
///
/// let config = load_config(Path::new("config.toml")).unwrap();
/// let client = build_http_client(&config.scraper, &config.user_agent).unwrap();
/// ```
pub fn build_http_client(
    scraper: &ScraperConfig,
    user_agent: &UserAgentConfig,
) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder()
        .user_agent(user_agent.header_value())
        .timeout(scraper.request_timeout())
        .connect_timeout(scraper.connect_timeout())
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true);

    if let Some(proxy) = &scraper.proxy {
        builder = builder.proxy(Proxy::all(proxy)?);
    }

    builder.build()
}

/// Fetches one page
///
/// # Returns
///
/// * `Ok(FetchedPage)` - 2xx response with its body
/// * `Err(TransportError)` - Non-success status, network failure or timeout
pub async fn fetch_page(client: &Client, url: &str) -> Result<FetchedPage, TransportError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| TransportError::from_reqwest(&e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(TransportError::Status(status.as_u16()));
    }

    let final_url = response.url().to_string();
    let body = response
        .text()
        .await
        .map_err(|e| TransportError::Body(e.to_string()))?;

    Ok(FetchedPage {
        final_url,
        status_code: status.as_u16(),
        body,
    })
}

/// Checks that the catalogue root is a valid URL and answers with a success status
///
/// # Returns
///
/// * `Ok(())` - The root responded
/// * `Err(ScrapeError::TargetUnreachable)` - Invalid URL or failed fetch
pub async fn check_reachable(client: &Client, base_url: &str) -> Result<(), ScrapeError> {
    let url = parse_base_url(base_url).map_err(|e| ScrapeError::TargetUnreachable {
        url: base_url.to_string(),
        reason: e.to_string(),
    })?;

    fetch_page(client, url.as_str())
        .await
        .map(|_| ())
        .map_err(|e| ScrapeError::TargetUnreachable {
            url: base_url.to_string(),
            reason: e.to_string(),
        })
}
