//! Storage module for persisting scraped books
//!
//! This module handles all database operations, including:
//! - SQLite database initialization and schema management
//! - Identity-keyed lookup, insert, and in-place update of books
//! - Page-sized batch transactions (begin, flush, commit, rollback)
//! - Scrape run tracking

mod schema;
mod sqlite;
#[cfg(test)]
pub(crate) mod testing;
mod traits;
mod upsert;

pub use sqlite::SqliteStorage;
pub use traits::{BookStore, StorageError, StorageResult};
pub use upsert::{save_batch, BatchOutcome, UpsertAction};

use crate::BookFlowError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Initializes or opens a storage database
pub fn open_storage(path: &Path) -> Result<SqliteStorage, BookFlowError> {
    SqliteStorage::new(path)
}

/// One scraped item that has not been persisted yet
///
/// Drafts are produced per listing page and consumed immediately by
/// [`save_batch`]; they are never stored as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct DraftRecord {
    pub title: String,
    pub author: Option<String>,
    pub year: Option<i32>,
    pub category: Option<String>,
    pub price: f64,
    pub rating: Option<f64>,
    pub available: bool,
    pub image: Option<String>,
}

impl DraftRecord {
    /// Creates a draft with only the mandatory fields set
    pub fn new(title: impl Into<String>, price: f64) -> Self {
        Self {
            title: title.into(),
            author: None,
            year: None,
            category: None,
            price,
            rating: None,
            available: true,
            image: None,
        }
    }
}

/// A persisted book row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredBook {
    pub id: i64,
    pub title: String,
    pub author: Option<String>,
    pub year: Option<i32>,
    pub category: Option<String>,
    pub price: f64,
    pub rating: Option<f64>,
    pub available: bool,
    pub image: Option<String>,
    pub created_at: String,
    pub updated_at: Option<String>,
}

/// Which fields decide whether a draft updates an existing book
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IdentityPolicy {
    /// Match on (title, image); distinct items sharing a title stay distinct
    #[default]
    TitleAndImage,

    /// Match on title alone; later sightings of a title overwrite earlier ones
    TitleOnly,
}

impl IdentityPolicy {
    /// Builds the lookup key for a draft under this policy
    pub fn key_for<'a>(&self, draft: &'a DraftRecord) -> IdentityKey<'a> {
        match self {
            Self::TitleAndImage => IdentityKey::TitleAndImage {
                title: &draft.title,
                image: draft.image.as_deref(),
            },
            Self::TitleOnly => IdentityKey::Title(&draft.title),
        }
    }
}

/// Lookup key for identity matching
///
/// A missing image is part of the key: it only matches rows whose image is
/// also missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityKey<'a> {
    TitleAndImage {
        title: &'a str,
        image: Option<&'a str>,
    },
    Title(&'a str),
}

/// Filters for catalog queries
///
/// Text filters are case-insensitive substring matches; price bounds are
/// inclusive. Unset filters match everything.
#[derive(Debug, Clone, Default)]
pub struct BookQuery {
    pub title: Option<String>,
    pub category: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
}

impl BookQuery {
    /// Returns true if `book` passes every set filter
    pub fn matches(&self, book: &StoredBook) -> bool {
        if let Some(title) = &self.title {
            if !contains_ignore_case(&book.title, title) {
                return false;
            }
        }

        if let Some(category) = &self.category {
            match &book.category {
                Some(c) if contains_ignore_case(c, category) => {}
                _ => return false,
            }
        }

        if let Some(min) = self.min_price {
            if book.price < min {
                return false;
            }
        }

        if let Some(max) = self.max_price {
            if book.price > max {
                return false;
            }
        }

        true
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Represents a scrape run
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub config_hash: String,
    pub status: RunStatus,
    pub totals: RunTotals,
}

/// Counters recorded when a run finishes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunTotals {
    pub scraped_count: u64,
    pub saved_count: u64,
    pub pages_processed: u32,
}

/// Status of a scrape run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}
