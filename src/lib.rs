//! Catalogue Scraper: product extraction with content-addressed deduplication
//!
//! This crate walks a paginated e-commerce catalogue, extracts a title, price
//! and image URL from every product card, and stores only the records it has
//! not seen before. Identity is derived from the record content, so re-running
//! a scrape over unchanged pages inserts nothing new.

pub mod config;
pub mod crawler;
pub mod output;
pub mod product;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for catalogue scraper operations
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Target unreachable: {url}: {reason}")]
    TargetUnreachable { url: String, reason: String },

    #[error("Page count must be at least 1, got {0}")]
    InvalidPageCount(u32),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for catalogue scraper operations
pub type Result<T> = std::result::Result<T, ScrapeError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{traverse, Coordinator, TraversalReport};
pub use product::{ContentId, IdentityScheme, ProductRecord, StoredRecord};
pub use storage::{ProductStore, SqliteStorage, UpsertOutcome};
