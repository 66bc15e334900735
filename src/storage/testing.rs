//! Store doubles shared by unit tests

use crate::storage::{
    BookStore, DraftRecord, IdentityKey, RunRecord, RunStatus, RunTotals, SqliteStorage,
    StorageError, StorageResult, StoredBook,
};

/// Delegates to SQLite but fails every commit, as if the disk went away
pub(crate) struct CommitFails(pub SqliteStorage);

impl CommitFails {
    pub fn in_memory() -> Self {
        Self(SqliteStorage::new_in_memory().unwrap())
    }
}

impl BookStore for CommitFails {
    fn begin_batch(&mut self) -> StorageResult<()> {
        self.0.begin_batch()
    }
    fn commit_batch(&mut self) -> StorageResult<()> {
        Err(StorageError::Database("disk I/O error".to_string()))
    }
    fn rollback_batch(&mut self) -> StorageResult<()> {
        self.0.rollback_batch()
    }
    fn find_by_identity(&self, key: &IdentityKey<'_>) -> StorageResult<Option<StoredBook>> {
        self.0.find_by_identity(key)
    }
    fn insert_book(&mut self, draft: &DraftRecord) -> StorageResult<i64> {
        self.0.insert_book(draft)
    }
    fn update_book(&mut self, book_id: i64, draft: &DraftRecord) -> StorageResult<()> {
        self.0.update_book(book_id, draft)
    }
    fn get_book(&self, book_id: i64) -> StorageResult<StoredBook> {
        self.0.get_book(book_id)
    }
    fn list_books(&self) -> StorageResult<Vec<StoredBook>> {
        self.0.list_books()
    }
    fn count_books(&self) -> StorageResult<u64> {
        self.0.count_books()
    }
    fn list_categories(&self) -> StorageResult<Vec<String>> {
        self.0.list_categories()
    }
    fn start_run(&mut self, config_hash: &str) -> StorageResult<i64> {
        self.0.start_run(config_hash)
    }
    fn finish_run(&mut self, run_id: i64, status: RunStatus, totals: &RunTotals) -> StorageResult<()> {
        self.0.finish_run(run_id, status, totals)
    }
    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
        self.0.get_run(run_id)
    }
    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>> {
        self.0.get_latest_run()
    }
}
