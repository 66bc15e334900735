//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the BookStore trait.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{BookStore, StorageError, StorageResult};
use crate::storage::{
    DraftRecord, IdentityKey, RunRecord, RunStatus, RunTotals, StoredBook,
};
use crate::BookFlowError;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

const BOOK_COLUMNS: &str = "id, title, author, year, category, price, rating, available, image,
     created_at, updated_at";

const RUN_COLUMNS: &str = "id, started_at, finished_at, config_hash, status, scraped_count,
     saved_count, pages_processed";

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(BookFlowError)` - Failed to open database
    pub fn new(path: &Path) -> Result<Self, BookFlowError> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> Result<Self, BookFlowError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Returns true while a batch transaction is open
    pub fn in_batch(&self) -> bool {
        !self.conn.is_autocommit()
    }
}

fn row_to_book(row: &Row<'_>) -> rusqlite::Result<StoredBook> {
    Ok(StoredBook {
        id: row.get(0)?,
        title: row.get(1)?,
        author: row.get(2)?,
        year: row.get(3)?,
        category: row.get(4)?,
        price: row.get(5)?,
        rating: row.get(6)?,
        available: row.get(7)?,
        image: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

fn row_to_run(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    Ok(RunRecord {
        id: row.get(0)?,
        started_at: row.get(1)?,
        finished_at: row.get(2)?,
        config_hash: row.get(3)?,
        status: RunStatus::from_db_string(&row.get::<_, String>(4)?)
            .unwrap_or(RunStatus::Running),
        totals: RunTotals {
            scraped_count: row.get::<_, i64>(5)? as u64,
            saved_count: row.get::<_, i64>(6)? as u64,
            pages_processed: row.get(7)?,
        },
    })
}

/// Maps constraint failures to their own variant so callers can log them as row rejections
fn classify_write_error(err: rusqlite::Error) -> StorageError {
    match err {
        rusqlite::Error::SqliteFailure(code, message)
            if code.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            StorageError::ConstraintViolation(
                message.unwrap_or_else(|| "constraint failed".to_string()),
            )
        }
        other => StorageError::Sqlite(other),
    }
}

impl BookStore for SqliteStorage {
    // ===== Batch Transactions =====

    fn begin_batch(&mut self) -> StorageResult<()> {
        if self.in_batch() {
            return Err(StorageError::Database(
                "a batch transaction is already open".to_string(),
            ));
        }
        self.conn.execute_batch("BEGIN IMMEDIATE")?;
        Ok(())
    }

    fn commit_batch(&mut self) -> StorageResult<()> {
        if !self.in_batch() {
            return Err(StorageError::NoActiveBatch);
        }
        self.conn.execute_batch("COMMIT")?;
        Ok(())
    }

    fn rollback_batch(&mut self) -> StorageResult<()> {
        if self.in_batch() {
            self.conn.execute_batch("ROLLBACK")?;
        }
        Ok(())
    }

    // ===== Book Upsert =====

    fn find_by_identity(&self, key: &IdentityKey<'_>) -> StorageResult<Option<StoredBook>> {
        let book = match key {
            // `IS` gives null-safe equality, so a missing image matches only missing images
            IdentityKey::TitleAndImage { title, image } => self
                .conn
                .query_row(
                    &format!(
                        "SELECT {} FROM books WHERE title = ?1 AND image IS ?2
                         ORDER BY id ASC LIMIT 1",
                        BOOK_COLUMNS
                    ),
                    params![title, image],
                    row_to_book,
                )
                .optional()?,
            IdentityKey::Title(title) => self
                .conn
                .query_row(
                    &format!(
                        "SELECT {} FROM books WHERE title = ?1 ORDER BY id ASC LIMIT 1",
                        BOOK_COLUMNS
                    ),
                    params![title],
                    row_to_book,
                )
                .optional()?,
        };

        Ok(book)
    }

    fn insert_book(&mut self, draft: &DraftRecord) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn
            .execute(
                "INSERT INTO books (title, author, year, category, price, rating, available,
                 image, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    draft.title,
                    draft.author,
                    draft.year,
                    draft.category,
                    draft.price,
                    draft.rating,
                    draft.available,
                    draft.image,
                    now
                ],
            )
            .map_err(classify_write_error)?;

        Ok(self.conn.last_insert_rowid())
    }

    fn update_book(&mut self, book_id: i64, draft: &DraftRecord) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let changed = self
            .conn
            .execute(
                "UPDATE books SET title = ?1, author = ?2, year = ?3, category = ?4, price = ?5,
                 rating = ?6, available = ?7, image = ?8, updated_at = ?9 WHERE id = ?10",
                params![
                    draft.title,
                    draft.author,
                    draft.year,
                    draft.category,
                    draft.price,
                    draft.rating,
                    draft.available,
                    draft.image,
                    now,
                    book_id
                ],
            )
            .map_err(classify_write_error)?;

        if changed == 0 {
            return Err(StorageError::BookNotFound(book_id));
        }

        Ok(())
    }

    // ===== Catalog Queries =====

    fn get_book(&self, book_id: i64) -> StorageResult<StoredBook> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM books WHERE id = ?1", BOOK_COLUMNS),
                params![book_id],
                row_to_book,
            )
            .optional()?
            .ok_or(StorageError::BookNotFound(book_id))
    }

    fn list_books(&self) -> StorageResult<Vec<StoredBook>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {} FROM books ORDER BY id ASC", BOOK_COLUMNS))?;

        let books = stmt
            .query_map([], row_to_book)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(books)
    }

    fn count_books(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM books", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn list_categories(&self) -> StorageResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT category FROM books
             WHERE category IS NOT NULL AND category != ''
             ORDER BY category",
        )?;

        let categories = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;

        Ok(categories)
    }

    // ===== Run Tracking =====

    fn start_run(&mut self, config_hash: &str) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO scrape_runs (started_at, config_hash, status) VALUES (?1, ?2, ?3)",
            params![now, config_hash, RunStatus::Running.to_db_string()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn finish_run(
        &mut self,
        run_id: i64,
        status: RunStatus,
        totals: &RunTotals,
    ) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let changed = self.conn.execute(
            "UPDATE scrape_runs SET status = ?1, finished_at = ?2, scraped_count = ?3,
             saved_count = ?4, pages_processed = ?5 WHERE id = ?6",
            params![
                status.to_db_string(),
                now,
                totals.scraped_count as i64,
                totals.saved_count as i64,
                totals.pages_processed,
                run_id
            ],
        )?;

        if changed == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }

        Ok(())
    }

    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM scrape_runs WHERE id = ?1", RUN_COLUMNS),
                params![run_id],
                row_to_run,
            )
            .optional()?
            .ok_or(StorageError::RunNotFound(run_id))
    }

    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let run = self
            .conn
            .query_row(
                &format!(
                    "SELECT {} FROM scrape_runs ORDER BY id DESC LIMIT 1",
                    RUN_COLUMNS
                ),
                [],
                row_to_run,
            )
            .optional()?;

        Ok(run)
    }
}
