use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigResult;
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use catalogue_scraper::config::load_config;
///
/// let config = load_config(Path::new("config.toml")).unwrap();
/// println!("Base URL: {}", config.scraper.base_url);
/// ```
pub fn load_config(path: &Path) -> ConfigResult<Config> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses and validates configuration from TOML text
pub fn parse_config(content: &str) -> ConfigResult<Config> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

/// Command-line values that take precedence over the configuration file
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub base_url: Option<String>,
    pub num_pages: Option<u32>,
    pub proxy: Option<String>,
}

/// Applies overrides to a loaded configuration and validates the result
pub fn apply_overrides(mut config: Config, overrides: Overrides) -> ConfigResult<Config> {
    if let Some(base_url) = overrides.base_url {
        config.scraper.base_url = base_url;
    }
    if let Some(num_pages) = overrides.num_pages {
        config.scraper.num_pages = num_pages;
    }
    if let Some(proxy) = overrides.proxy {
        config.scraper.proxy = Some(proxy);
    }

    validate(&config)?;
    Ok(config)
}
