//! Statistics generation from the product database
//!
//! This module provides functionality for extracting and displaying
//! statistics from the storage layer.

use crate::storage::{ProductStore, RunRecord};
use crate::ScrapeError;

/// Product database statistics summary
#[derive(Debug, Clone)]
pub struct StoreStatistics {
    /// Total number of stored products
    pub total_products: u64,

    /// Identity scheme the store keys records with
    pub identity_scheme: &'static str,

    /// Most recent run, if any run was recorded
    pub latest_run: Option<RunRecord>,
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `storage` - The storage backend to query
///
/// # Returns
///
/// * `Ok(StoreStatistics)` - Successfully loaded statistics
/// * `Err(ScrapeError)` - Failed to query statistics
pub fn load_statistics<S: ProductStore + ?Sized>(storage: &S) -> Result<StoreStatistics, ScrapeError> {
    Ok(StoreStatistics {
        total_products: storage.count()?,
        identity_scheme: storage.identity_scheme().as_str(),
        latest_run: storage.latest_run()?,
    })
}

/// Formats statistics as a human-readable block
pub fn format_statistics(stats: &StoreStatistics) -> String {
    let mut out = String::new();

    out.push_str("=== Product Database Statistics ===\n\n");
    out.push_str(&format!("Stored products: {}\n", stats.total_products));
    out.push_str(&format!("Identity scheme: {}\n", stats.identity_scheme));

    match &stats.latest_run {
        Some(run) => {
            out.push_str(&format!("\nLatest Run (#{}):\n", run.id));
            out.push_str(&format!("  Catalogue: {}\n", run.base_url));
            out.push_str(&format!("  Pages requested: {}\n", run.num_pages));
            out.push_str(&format!("  Started: {}\n", run.started_at));
            out.push_str(&format!(
                "  Finished: {}\n",
                run.finished_at.as_deref().unwrap_or("(not finished)")
            ));
            out.push_str(&format!("  Status: {}\n", run.status.to_db_string()));
            out.push_str(&format!("  Inserted: {}\n", run.inserted_count));
            out.push_str(&format!("  Existing: {}\n", run.existing_count));
            out.push_str(&format!("  Failed pages: {}\n", run.failed_pages));
        }
        None => {
            out.push_str("\nNo runs recorded\n");
        }
    }

    out
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &StoreStatistics) {
    print!("{}", format_statistics(stats));
}
