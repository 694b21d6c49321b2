//! Storage module for persisting scraped products
//!
//! This module handles all database operations for the scraper, including:
//! - SQLite database initialization and schema management
//! - Content-addressed product insertion (insert-if-absent)
//! - Run tracking for end-of-run summaries

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{ProductStore, StorageError, StorageResult};

use crate::product::{ContentId, IdentityScheme};
use crate::ScrapeError;

use std::path::Path;

/// Initializes or opens a storage database
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
/// * `scheme` - Identity scheme used to key new records
///
/// # Returns
///
/// * `Ok(SqliteStorage)` - Successfully initialized storage
/// * `Err(ScrapeError)` - Failed to initialize storage
pub fn open_storage(path: &Path, scheme: IdentityScheme) -> Result<SqliteStorage, ScrapeError> {
    SqliteStorage::new(path, scheme)
}

/// Result of an insert-if-absent call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// No record with this identity existed; it has been stored
    Inserted(ContentId),
    /// A record with this identity was already stored; nothing changed
    Existing(ContentId),
}

impl UpsertOutcome {
    pub fn id(&self) -> &ContentId {
        match self {
            Self::Inserted(id) | Self::Existing(id) => id,
        }
    }

    pub fn is_inserted(&self) -> bool {
        matches!(self, Self::Inserted(_))
    }
}

/// Represents a scrape run in the database
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub base_url: String,
    pub num_pages: u32,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub inserted_count: u64,
    pub existing_count: u64,
    pub failed_pages: u32,
    pub status: RunStatus,
}

/// Final tallies written when a run finishes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunTotals {
    pub inserted_count: u64,
    pub existing_count: u64,
    pub failed_pages: u32,
    pub status: RunStatus,
}

/// Status of a scrape run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Started but never finished (still running or interrupted)
    Running,
    /// Every page fetched and every record stored
    Completed,
    /// Finished, but some pages or records failed
    Partial,
    /// Finished without fetching a single page
    Failed,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Partial => "partial",
            Self::Failed => "failed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "partial" => Some(Self::Partial),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}
