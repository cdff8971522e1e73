//! # contract: trait seams between the engine and the outside world
//!
//! This module defines the three interfaces the reconciliation run depends on:
//! - [`DogStore`]: the persisted Current/Archive/Logs tables.
//! - [`Producer`]: one rescue source yielding canonical records.
//! - [`SheetRows`]: read access to partner-maintained spreadsheets, used by
//!   spreadsheet-backed producers.
//!
//! ## Mocking & Testing
//! - Every trait is annotated for `mockall`, so tests can script store
//!   behavior (including failures) without a network.
//!
//! ## Error Handling
//! - Store and sheet errors are boxed trait objects. Any store error is fatal
//!   to the run; the engine never retries.
//! - Producers have no error channel: a source that cannot be read must log
//!   the failure and return an empty list.

use async_trait::async_trait;
use std::collections::HashMap;

use mockall::automock;

use crate::record::{DogRecord, StoredDog, Table};

/// Error type for store and sheet access.
pub type StoreError = Box<dyn std::error::Error + Send + Sync>;

/// Persisted store of dog rows.
///
/// Positions are 0-based indices of data rows in the order returned by
/// [`DogStore::read_current`]; the header row is not counted. Deleting a row
/// shifts every later position down by one, so callers delete from the highest
/// position first.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait DogStore: Send + Sync {
    /// All rows of the Current table, in persisted order.
    async fn read_current(&self) -> Result<Vec<StoredDog>, StoreError>;

    /// Append one row to the end of the given table.
    async fn append_row(&self, table: Table, row: Vec<String>) -> Result<(), StoreError>;

    /// Overwrite the leading `row.len()` cells of the Current row at `position`.
    async fn update_row(&self, position: usize, row: Vec<String>) -> Result<(), StoreError>;

    /// Delete the Current row at `position`.
    async fn delete_row(&self, position: usize) -> Result<(), StoreError>;
}

/// A single rescue source.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait Producer: Send + Sync {
    /// Display name used in logs and the per-producer report.
    fn name(&self) -> String;

    /// Fetch and normalize current listings. Never fails; returns an empty list on error.
    async fn produce(&self) -> Vec<DogRecord>;
}

/// Read access to shared spreadsheets by name.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait SheetRows: Send + Sync {
    /// Records of the first worksheet, keyed by the header row.
    async fn fetch_records(
        &self,
        spreadsheet: &str,
    ) -> Result<Vec<HashMap<String, String>>, StoreError>;
}
