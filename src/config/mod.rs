//! Configuration module for the catalogue scraper
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use catalogue_scraper::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config.toml")).unwrap();
//! println!("Will scrape {} pages", config.scraper.num_pages);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, OutputConfig, ScraperConfig, UserAgentConfig};

// Re-export parser functions
pub use parser::{apply_overrides, load_config, parse_config, Overrides};
pub use validation::validate;
