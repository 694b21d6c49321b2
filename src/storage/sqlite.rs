//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the ProductStore trait.

use crate::product::{ContentId, IdentityScheme, ProductRecord, StoredRecord};
use crate::storage::schema::{detect_product_layout, initialize_schema, ProductLayout};
use crate::storage::traits::{ProductStore, StorageError, StorageResult};
use crate::storage::{RunRecord, RunStatus, RunTotals, UpsertOutcome};
use crate::ScrapeError;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
    scheme: IdentityScheme,
    layout: ProductLayout,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// Creates the database file and schema if they do not exist yet. A
    /// `products` table left by the legacy scraper is used in place, which
    /// requires the `concatenated` identity scheme.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    /// * `scheme` - Identity scheme used to key records
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(ScrapeError)` - Failed to open database, or its `products` table
    ///   cannot be used with `scheme`
    pub fn new(path: &Path, scheme: IdentityScheme) -> Result<Self, ScrapeError> {
        let conn = Connection::open(path)?;

        // Configure SQLite for better performance
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA busy_timeout = 5000;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        Self::from_connection(conn, scheme)
    }

    /// Creates an in-memory database
    pub fn new_in_memory(scheme: IdentityScheme) -> Result<Self, ScrapeError> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn, scheme)
    }

    fn from_connection(conn: Connection, scheme: IdentityScheme) -> Result<Self, ScrapeError> {
        initialize_schema(&conn)?;

        let layout = detect_product_layout(&conn)?;
        if layout == ProductLayout::Legacy && scheme != IdentityScheme::Concatenated {
            return Err(StorageError::SchemeMismatch {
                stored: IdentityScheme::Concatenated.as_str(),
                configured: scheme.as_str(),
            }
            .into());
        }

        tracing::debug!("Opened products table ({:?} layout)", layout);
        Ok(Self {
            conn,
            scheme,
            layout,
        })
    }

    /// Column layout of the `products` table
    pub fn layout(&self) -> ProductLayout {
        self.layout
    }
}

/// Maps a `products` row (id, title, price, image_url) to a stored record
///
/// Legacy tables allow NULL fields; those read back as empty strings.
fn stored_record_from_row(row: &Row<'_>) -> rusqlite::Result<(String, ProductRecord)> {
    Ok((
        row.get(0)?,
        ProductRecord {
            title: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
            price: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
            image_url: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
        },
    ))
}

/// Maps a `runs` row to a run record
fn run_record_from_row(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    Ok(RunRecord {
        id: row.get(0)?,
        base_url: row.get(1)?,
        num_pages: row.get(2)?,
        started_at: row.get(3)?,
        finished_at: row.get(4)?,
        inserted_count: row.get::<_, i64>(5)? as u64,
        existing_count: row.get::<_, i64>(6)? as u64,
        failed_pages: row.get(7)?,
        status: RunStatus::from_db_string(&row.get::<_, String>(8)?)
            .unwrap_or(RunStatus::Running),
    })
}

const RUN_COLUMNS: &str = "id, base_url, num_pages, started_at, finished_at, inserted_count, \
                           existing_count, failed_pages, status";

impl ProductStore for SqliteStorage {
    fn identity_scheme(&self) -> IdentityScheme {
        self.scheme
    }

    // ===== Products =====

    fn upsert(&mut self, record: &ProductRecord) -> StorageResult<UpsertOutcome> {
        let id = record.content_id(self.scheme);

        // The primary key makes this a single compare-and-insert
        let changed = self.conn.execute(
            &self.layout.insert_sql(),
            params![id.as_str(), record.title, record.price, record.image_url],
        )?;

        if changed == 1 {
            Ok(UpsertOutcome::Inserted(id))
        } else {
            Ok(UpsertOutcome::Existing(id))
        }
    }

    fn contains(&self, id: &ContentId) -> StorageResult<bool> {
        let found: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM products WHERE id = ?1",
                params![id.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn retrieve_all(&self) -> StorageResult<Vec<StoredRecord>> {
        let mut stmt = self
            .conn
            .prepare(&self.layout.select_all_sql())?;

        let rows = stmt
            .query_map([], stored_record_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(raw_id, record)| -> StorageResult<StoredRecord> {
                let id = ContentId::from_hex(&raw_id).ok_or_else(|| StorageError::CorruptRecord {
                    id: raw_id.clone(),
                    reason: "id is not a 64-character hex digest".to_string(),
                })?;
                Ok(StoredRecord { id, record })
            })
            .collect()
    }

    fn count(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM products", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    // ===== Run Tracking =====

    fn begin_run(&mut self, base_url: &str, num_pages: u32) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (base_url, num_pages, started_at, status) VALUES (?1, ?2, ?3, ?4)",
            params![base_url, num_pages, now, RunStatus::Running.to_db_string()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn finish_run(&mut self, run_id: i64, totals: &RunTotals) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn.execute(
            "UPDATE runs SET finished_at = ?1, inserted_count = ?2, existing_count = ?3,
             failed_pages = ?4, status = ?5 WHERE id = ?6",
            params![
                now,
                totals.inserted_count as i64,
                totals.existing_count as i64,
                totals.failed_pages,
                totals.status.to_db_string(),
                run_id
            ],
        )?;

        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM runs WHERE id = ?1", RUN_COLUMNS),
                params![run_id],
                run_record_from_row,
            )
            .optional()?
            .ok_or(StorageError::RunNotFound(run_id))
    }

    fn latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let run = self
            .conn
            .query_row(
                &format!("SELECT {} FROM runs ORDER BY id DESC LIMIT 1", RUN_COLUMNS),
                [],
                run_record_from_row,
            )
            .optional()?;
        Ok(run)
    }
}
