//! Report types and output errors

use crate::output::stats::CatalogStatistics;
use crate::storage::{RunRecord, StorageError};
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Everything the markdown catalog report shows
#[derive(Debug, Clone)]
pub struct CatalogReport {
    /// When the report was generated (RFC 3339)
    pub generated_at: String,

    /// Most recent scrape run, if any was recorded
    pub latest_run: Option<RunRecord>,

    pub statistics: CatalogStatistics,
}

impl CatalogReport {
    /// Seconds between the latest run's start and finish
    pub fn run_duration_seconds(&self) -> Option<i64> {
        let run = self.latest_run.as_ref()?;
        let started = chrono::DateTime::parse_from_rfc3339(&run.started_at).ok()?;
        let finished = chrono::DateTime::parse_from_rfc3339(run.finished_at.as_deref()?).ok()?;
        Some((finished - started).num_seconds())
    }

    /// Share of scraped drafts that were saved in the latest run, as a percentage
    pub fn save_rate(&self) -> Option<f64> {
        let totals = &self.latest_run.as_ref()?.totals;
        if totals.scraped_count == 0 {
            return None;
        }
        Some(totals.saved_count as f64 / totals.scraped_count as f64 * 100.0)
    }
}
