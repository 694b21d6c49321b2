//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::product::{ContentId, IdentityScheme, ProductRecord, StoredRecord};
use crate::storage::{RunRecord, RunTotals, UpsertOutcome};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("Corrupt record {id}: {reason}")]
    CorruptRecord { id: String, reason: String },

    #[error("Unsupported products table layout: {0}")]
    IncompatibleSchema(String),

    #[error("Products table was keyed with the '{stored}' identity scheme, not '{configured}'")]
    SchemeMismatch {
        stored: &'static str,
        configured: &'static str,
    },

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for content-addressed product stores
///
/// Records are keyed by their [`ContentId`]. A stored record is never updated
/// or removed; the store only grows.
pub trait ProductStore {
    /// The identity scheme used to key records in this store
    fn identity_scheme(&self) -> IdentityScheme;

    // ===== Products =====

    /// Stores the record if no record with the same identity exists
    ///
    /// The existence check and the insert are a single atomic operation, so
    /// two writers racing on the same record produce exactly one `Inserted`.
    fn upsert(&mut self, record: &ProductRecord) -> StorageResult<UpsertOutcome>;

    /// Checks whether a record with this identity is stored
    fn contains(&self, id: &ContentId) -> StorageResult<bool>;

    /// Returns every stored record, ordered by identity
    fn retrieve_all(&self) -> StorageResult<Vec<StoredRecord>>;

    /// Counts stored records
    fn count(&self) -> StorageResult<u64>;

    // ===== Run Tracking =====

    /// Records the start of a scrape run and returns its ID
    fn begin_run(&mut self, base_url: &str, num_pages: u32) -> StorageResult<i64>;

    /// Writes final tallies and a finish timestamp for a run
    fn finish_run(&mut self, run_id: i64, totals: &RunTotals) -> StorageResult<()>;

    /// Gets a run by ID
    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord>;

    /// Gets the most recent run
    fn latest_run(&self) -> StorageResult<Option<RunRecord>>;
}
