use crate::product::IdentityScheme;
use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for the catalogue scraper
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub scraper: ScraperConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
}

/// Catalogue traversal configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ScraperConfig {
    /// Catalogue root; pages are fetched from `{base-url}/page/{n}`
    pub base_url: String,

    /// Number of pages to visit, starting at 1
    pub num_pages: u32,

    /// Proxy applied to both HTTP and HTTPS requests
    #[serde(default)]
    pub proxy: Option<String>,

    /// Maximum number of page fetches in flight at once
    #[serde(default = "default_max_concurrent_pages")]
    pub max_concurrent_pages: u32,

    /// Whole-request timeout for a single fetch (seconds)
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Connection establishment timeout (seconds)
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Check that the catalogue root answers before traversing
    #[serde(default = "default_preflight")]
    pub preflight: bool,
}

impl ScraperConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

fn default_max_concurrent_pages() -> u32 {
    1
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_preflight() -> bool {
    true
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct UserAgentConfig {
    /// Name of the scraper
    pub crawler_name: String,

    /// Version of the scraper
    pub crawler_version: String,

    /// URL with information about the scraper
    pub contact_url: String,

    /// Email address for scraper-related contact
    #[serde(default)]
    pub contact_email: Option<String>,
}

impl UserAgentConfig {
    /// Formats the `User-Agent` header value
    ///
    /// `Name/Version (+ContactURL)` or `Name/Version (+ContactURL; ContactEmail)`
    pub fn header_value(&self) -> String {
        match &self.contact_email {
            Some(email) => format!(
                "{}/{} (+{}; {})",
                self.crawler_name, self.crawler_version, self.contact_url, email
            ),
            None => format!(
                "{}/{} (+{})",
                self.crawler_name, self.crawler_version, self.contact_url
            ),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Path to the SQLite database file
    pub database_path: String,

    /// How product identities are derived
    #[serde(default)]
    pub identity_scheme: IdentityScheme,
}
