//! Book-Flow: a book catalog scraper
//!
//! This crate crawls a paginated book catalog page by page, extracts a draft
//! record for every listed item (enriched from its detail page), and upserts
//! the drafts into a SQLite store one page-sized transaction at a time.

pub mod config;
pub mod crawler;
pub mod output;
pub mod site;
pub mod state;
pub mod storage;

use thiserror::Error;

/// Main error type for Book-Flow operations
#[derive(Debug, Error)]
pub enum BookFlowError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::ScrapeState,
        to: state::ScrapeState,
    },

    #[error("No books were saved ({scraped_count} scraped over {pages_processed} pages)")]
    NothingSaved {
        scraped_count: u64,
        pages_processed: u32,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Book-Flow operations
pub type Result<T> = std::result::Result<T, BookFlowError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{run_scrape, ScrapeSummary};
pub use state::ScrapeState;
pub use storage::{BookStore, DraftRecord, IdentityPolicy, SqliteStorage, StoredBook};
