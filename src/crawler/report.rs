//! Traversal results
//!
//! A [`TraversalReport`] carries every extracted record plus the tallies and
//! failures of one run. Page and store failures are collected here instead of
//! aborting the run.

use crate::crawler::TransportError;
use crate::product::{ContentId, ProductRecord};
use crate::storage::{RunStatus, RunTotals};
use chrono::{DateTime, Utc};

/// A page that could not be fetched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageFailure {
    /// 1-based page index
    pub page: u32,
    pub url: String,
    pub error: TransportError,
}

/// A record the store could not persist
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreFailure {
    pub id: ContentId,
    pub record: ProductRecord,
    pub error: String,
}

/// Outcome of a complete traversal
#[derive(Debug, Clone)]
pub struct TraversalReport {
    /// Run ID in the store, if run bookkeeping succeeded
    pub run_id: Option<i64>,
    pub base_url: String,
    /// Every extracted record, grouped by page then fragment order
    pub records: Vec<ProductRecord>,
    pub inserted_count: u64,
    pub existing_count: u64,
    pub pages_requested: u32,
    pub pages_fetched: u32,
    pub page_failures: Vec<PageFailure>,
    pub store_failures: Vec<StoreFailure>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl TraversalReport {
    pub(crate) fn new(base_url: &str, pages_requested: u32) -> Self {
        let now = Utc::now();
        Self {
            run_id: None,
            base_url: base_url.to_string(),
            records: Vec::new(),
            inserted_count: 0,
            existing_count: 0,
            pages_requested,
            pages_fetched: 0,
            page_failures: Vec::new(),
            store_failures: Vec::new(),
            started_at: now,
            finished_at: now,
        }
    }

    /// Number of extracted records, stored or not
    pub fn total_products(&self) -> usize {
        self.records.len()
    }

    /// True when no page and no record failed
    pub fn is_clean(&self) -> bool {
        self.page_failures.is_empty() && self.store_failures.is_empty()
    }

    pub fn status(&self) -> RunStatus {
        if self.pages_fetched == 0 {
            RunStatus::Failed
        } else if self.is_clean() {
            RunStatus::Completed
        } else {
            RunStatus::Partial
        }
    }

    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }

    pub fn totals(&self) -> RunTotals {
        RunTotals {
            inserted_count: self.inserted_count,
            existing_count: self.existing_count,
            failed_pages: self.page_failures.len() as u32,
            status: self.status(),
        }
    }
}
