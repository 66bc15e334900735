//! Storage traits and error types
//!
//! This module defines the storage-handle interface the scrape pipeline
//! writes through, and associated error types.

use crate::storage::{
    BookQuery, DraftRecord, IdentityKey, RunRecord, RunStatus, RunTotals, StoredBook,
};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Book not found: {0}")]
    BookNotFound(i64),

    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("No batch transaction is active")]
    NoActiveBatch,

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage handle used by the scrape pipeline
///
/// Writes happen inside a batch: `begin_batch`, any number of lookups,
/// inserts and updates, then `flush` + `commit_batch`, or `rollback_batch`
/// to discard everything since `begin_batch`. A single writer uses the
/// handle at a time.
pub trait BookStore {
    // ===== Batch Transactions =====

    /// Opens the transaction for one page's drafts
    fn begin_batch(&mut self) -> StorageResult<()>;

    /// Pushes buffered writes to the backend
    ///
    /// Backends that write through on every statement have nothing to do.
    fn flush(&mut self) -> StorageResult<()> {
        Ok(())
    }

    /// Makes every write since `begin_batch` durable
    fn commit_batch(&mut self) -> StorageResult<()>;

    /// Discards every write since `begin_batch`
    ///
    /// Rolling back with no batch open is a no-op.
    fn rollback_batch(&mut self) -> StorageResult<()>;

    // ===== Book Upsert =====

    /// Looks up the book a draft with this identity key would overwrite
    ///
    /// When several rows share the key, the oldest one is returned.
    fn find_by_identity(&self, key: &IdentityKey<'_>) -> StorageResult<Option<StoredBook>>;

    /// Creates a new book from a draft and returns its ID
    fn insert_book(&mut self, draft: &DraftRecord) -> StorageResult<i64>;

    /// Overwrites every mutable field of an existing book in place
    ///
    /// The ID and creation timestamp are never touched.
    fn update_book(&mut self, book_id: i64, draft: &DraftRecord) -> StorageResult<()>;

    // ===== Catalog Queries =====

    /// Gets a book by ID
    fn get_book(&self, book_id: i64) -> StorageResult<StoredBook>;

    /// Gets every stored book ordered by ID
    fn list_books(&self) -> StorageResult<Vec<StoredBook>>;

    /// Gets the number of stored books
    fn count_books(&self) -> StorageResult<u64>;

    /// Gets the sorted distinct non-empty categories
    fn list_categories(&self) -> StorageResult<Vec<String>>;

    /// Gets the books matching every filter in `query`
    fn search_books(&self, query: &BookQuery) -> StorageResult<Vec<StoredBook>> {
        Ok(self
            .list_books()?
            .into_iter()
            .filter(|book| query.matches(book))
            .collect())
    }

    // ===== Run Tracking =====

    /// Records the start of a scrape run and returns its ID
    fn start_run(&mut self, config_hash: &str) -> StorageResult<i64>;

    /// Records how a scrape run ended
    fn finish_run(&mut self, run_id: i64, status: RunStatus, totals: &RunTotals)
        -> StorageResult<()>;

    /// Gets a run by ID
    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord>;

    /// Gets the most recent run
    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>>;
}
