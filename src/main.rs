//! Catalogue scraper main entry point
//!
//! This is the command-line interface for the catalogue scraper.

use catalogue_scraper::config::{apply_overrides, load_config, Config, Overrides};
use catalogue_scraper::crawler::traverse;
use catalogue_scraper::storage::{open_storage, ProductStore};
use catalogue_scraper::url::page_urls;
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Catalogue scraper: extract product cards and store the ones not seen before
///
/// Pages are fetched from `{base-url}/page/1` up to `{base-url}/page/N`.
/// Products are deduplicated by a digest of their title, price and image URL,
/// so re-running over unchanged pages stores nothing new.
#[derive(Parser, Debug)]
#[command(name = "catalogue-scraper")]
#[command(version)]
#[command(about = "Scrape a paginated product catalogue into SQLite", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Catalogue base URL (overrides the config file)
    #[arg(long, value_name = "URL")]
    url: Option<String>,

    /// Number of pages to scrape (overrides the config file)
    #[arg(long, value_name = "N")]
    pages: Option<u32>,

    /// Proxy for both HTTP and HTTPS requests (overrides the config file)
    #[arg(long, value_name = "PROXY")]
    proxy: Option<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show which pages would be fetched
    #[arg(long, conflicts_with_all = ["stats", "list"])]
    dry_run: bool,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with_all = ["dry_run", "list"])]
    stats: bool,

    /// List every stored product and exit
    #[arg(long, conflicts_with_all = ["dry_run", "stats"])]
    list: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = match load_config(&cli.config).and_then(|config| {
        apply_overrides(
            config,
            Overrides {
                base_url: cli.url.clone(),
                num_pages: cli.pages,
                proxy: cli.proxy.clone(),
            },
        )
    }) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.stats {
        handle_stats(&config)?;
    } else if cli.list {
        handle_list(&config)?;
    } else {
        handle_scrape(&config).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("catalogue_scraper=info,warn"),
            1 => EnvFilter::new("catalogue_scraper=debug,info"),
            2 => EnvFilter::new("catalogue_scraper=trace,debug"),
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

/// Handles the --dry-run mode: shows the effective configuration and page URLs
fn handle_dry_run(config: &Config) {
    println!("=== Catalogue Scraper Dry Run ===\n");

    println!("Scraper Configuration:");
    println!("  Base URL: {}", config.scraper.base_url);
    println!("  Pages: {}", config.scraper.num_pages);
    println!(
        "  Proxy: {}",
        config.scraper.proxy.as_deref().unwrap_or("(none)")
    );
    println!(
        "  Max concurrent pages: {}",
        config.scraper.max_concurrent_pages
    );
    println!(
        "  Timeouts: {}s request, {}s connect",
        config.scraper.request_timeout_secs, config.scraper.connect_timeout_secs
    );
    println!("  Pre-flight check: {}", config.scraper.preflight);

    println!("\nUser Agent: {}", config.user_agent.header_value());

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);
    println!("  Identity scheme: {}", config.output.identity_scheme.as_str());

    println!("\nPages:");
    for (_, url) in page_urls(&config.scraper.base_url, config.scraper.num_pages) {
        println!("  - {}", url);
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    use catalogue_scraper::output::{load_statistics, print_statistics};

    println!("Database: {}\n", config.output.database_path);

    let storage = open_storage(
        Path::new(&config.output.database_path),
        config.output.identity_scheme,
    )?;
    let stats = load_statistics(&storage)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the --list mode: prints every stored product
fn handle_list(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    use catalogue_scraper::output::print_products;

    let storage = open_storage(
        Path::new(&config.output.database_path),
        config.output.identity_scheme,
    )?;
    print_products(&storage.retrieve_all()?);

    Ok(())
}

/// Handles the main scrape operation
async fn handle_scrape(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    use catalogue_scraper::output::print_report;

    match traverse(config).await {
        Ok(report) => {
            if report.pages_fetched == 0 {
                tracing::error!("No page of {} could be fetched", report.base_url);
            }
            print_report(&report);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Scrape failed: {}", e);
            Err(e.into())
        }
    }
}
