//! Output module for run summaries and stored data
//!
//! This module handles:
//! - The end-of-run summary of a traversal
//! - Statistics about the product database
//! - Listing stored records

pub mod stats;
mod summary;

pub use stats::{format_statistics, load_statistics, print_statistics, StoreStatistics};
pub use summary::{format_products, format_report, print_products, print_report};
