//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the product database.

use crate::storage::traits::{StorageError, StorageResult};

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Content-addressed product records; id is the hex SHA-256 content digest
CREATE TABLE IF NOT EXISTS products (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    price TEXT NOT NULL,
    image_url TEXT NOT NULL
);

-- Track scrape runs
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    base_url TEXT NOT NULL,
    num_pages INTEGER NOT NULL,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    inserted_count INTEGER NOT NULL DEFAULT 0,
    existing_count INTEGER NOT NULL DEFAULT 0,
    failed_pages INTEGER NOT NULL DEFAULT 0,
    status TEXT NOT NULL
);
"#;

/// Column layout of an existing `products` table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductLayout {
    /// `id, title, price, image_url`
    Current,

    /// `id, product_title, product_price, product_image_url`, as written by
    /// the legacy scraper. Its ids are plain concatenation digests.
    Legacy,
}

impl ProductLayout {
    /// Title, price and image URL column names
    pub fn columns(&self) -> [&'static str; 3] {
        match self {
            Self::Current => ["title", "price", "image_url"],
            Self::Legacy => ["product_title", "product_price", "product_image_url"],
        }
    }

    pub fn insert_sql(&self) -> String {
        let [title, price, image_url] = self.columns();
        format!(
            "INSERT OR IGNORE INTO products (id, {}, {}, {}) VALUES (?1, ?2, ?3, ?4)",
            title, price, image_url
        )
    }

    pub fn select_all_sql(&self) -> String {
        let [title, price, image_url] = self.columns();
        format!(
            "SELECT id, {}, {}, {} FROM products ORDER BY id",
            title, price, image_url
        )
    }
}

/// Reads the column names of the `products` table and classifies its layout
///
/// # Returns
///
/// * `Ok(ProductLayout)` - The table has all columns of a known layout
/// * `Err(StorageError::IncompatibleSchema)` - Columns match no known layout
pub fn detect_product_layout(conn: &rusqlite::Connection) -> StorageResult<ProductLayout> {
    let mut stmt = conn.prepare("PRAGMA table_info(products)")?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<Result<Vec<_>, _>>()?;

    let has_all = |layout: ProductLayout| {
        std::iter::once("id")
            .chain(layout.columns())
            .all(|name| columns.iter().any(|column| column.eq_ignore_ascii_case(name)))
    };

    [ProductLayout::Current, ProductLayout::Legacy]
        .into_iter()
        .find(|layout| has_all(*layout))
        .ok_or_else(|| {
            StorageError::IncompatibleSchema(format!(
                "products has columns [{}]",
                columns.join(", ")
            ))
        })
}

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
