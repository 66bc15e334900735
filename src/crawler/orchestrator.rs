//! Scrape orchestration
//!
//! Drives the page loop: scrape a page, save it as one batch, check for a
//! next page, repeat. Lower-level failures are logged and the loop moves on;
//! only a run that saved nothing at all is reported as an error.

use crate::config::Config;
use crate::crawler::pages::{CatalogScraper, CatalogSource};
use crate::state::ScrapeState;
use crate::storage::{save_batch, BookStore, IdentityPolicy, RunStatus, RunTotals};
use crate::BookFlowError;
use serde::Serialize;

/// Message reported by a run that saved at least one book
pub const SUCCESS_MESSAGE: &str = "Scraping completed successfully";

/// What a finished run reports to its caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScrapeSummary {
    pub message: String,
    pub scraped_count: u64,
    pub saved_count: u64,
    pub pages_processed: u32,
}

impl From<RunTotals> for ScrapeSummary {
    fn from(totals: RunTotals) -> Self {
        Self {
            message: SUCCESS_MESSAGE.to_string(),
            scraped_count: totals.scraped_count,
            saved_count: totals.saved_count,
            pages_processed: totals.pages_processed,
        }
    }
}

/// Scrape loop over a catalog source and a storage handle
pub struct Orchestrator<'a, S, B: ?Sized> {
    source: S,
    store: &'a mut B,
    policy: IdentityPolicy,
    config_hash: Option<String>,
    state: ScrapeState,
}

impl<'a, S, B> Orchestrator<'a, S, B>
where
    S: CatalogSource,
    B: BookStore + ?Sized,
{
    pub fn new(source: S, store: &'a mut B, policy: IdentityPolicy) -> Self {
        Self {
            source,
            store,
            policy,
            config_hash: None,
            state: ScrapeState::Init,
        }
    }

    /// Records runs in the store's run table under this config hash
    pub fn with_run_tracking(mut self, config_hash: impl Into<String>) -> Self {
        self.config_hash = Some(config_hash.into());
        self
    }

    pub fn state(&self) -> ScrapeState {
        self.state
    }

    fn transition(&mut self, next: ScrapeState) -> Result<(), BookFlowError> {
        if !self.state.can_transition_to(next) {
            return Err(BookFlowError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }
        tracing::trace!("{} -> {}", self.state, next);
        self.state = next;
        Ok(())
    }

    /// Runs the loop to completion
    ///
    /// # Returns
    ///
    /// * `Ok(ScrapeSummary)` - At least one book was saved
    /// * `Err(BookFlowError::NothingSaved)` - The run finished without saving anything
    pub async fn run(&mut self) -> Result<ScrapeSummary, BookFlowError> {
        // A used orchestrator must not leave a run row behind
        if self.state != ScrapeState::Init {
            return Err(BookFlowError::InvalidTransition {
                from: self.state,
                to: ScrapeState::FetchingPage,
            });
        }

        let run_id = self.start_run();

        let result = self.scrape_pages().await;

        let status = match &result {
            Ok(totals) if totals.saved_count > 0 => RunStatus::Completed,
            _ => RunStatus::Failed,
        };
        let totals = result.as_ref().copied().unwrap_or_default();
        self.finish_run(run_id, status, &totals);

        let totals = result?;
        if totals.saved_count == 0 {
            tracing::error!(
                "Run saved nothing: {} books scraped over {} pages",
                totals.scraped_count,
                totals.pages_processed
            );
            return Err(BookFlowError::NothingSaved {
                scraped_count: totals.scraped_count,
                pages_processed: totals.pages_processed,
            });
        }

        tracing::info!(
            "Scrape complete: {} scraped, {} saved, {} pages",
            totals.scraped_count,
            totals.saved_count,
            totals.pages_processed
        );
        Ok(ScrapeSummary::from(totals))
    }

    async fn scrape_pages(&mut self) -> Result<RunTotals, BookFlowError> {
        let mut totals = RunTotals::default();
        self.transition(ScrapeState::FetchingPage)?;

        let total_pages = self.source.get_total_pages().await;
        if total_pages > 0 {
            tracing::info!("Catalog reports {} pages", total_pages);
        }

        let mut page = 1;
        loop {
            let drafts = self.source.scrape_page(page, total_pages).await;
            if drafts.is_empty() {
                tracing::info!("Page {} is empty, stopping", page);
                break;
            }

            totals.pages_processed += 1;
            totals.scraped_count += drafts.len() as u64;

            self.transition(ScrapeState::SavingPage)?;
            match save_batch(&mut *self.store, &drafts, self.policy) {
                Ok(outcome) => totals.saved_count += outcome.saved() as u64,
                Err(e) => tracing::error!(
                    "Failed to save page {} ({} drafts): {}",
                    page,
                    drafts.len(),
                    e
                ),
            }

            self.transition(ScrapeState::CheckingNext)?;
            if !self.source.has_next_page(page).await {
                tracing::info!("No page after {}, stopping", page);
                break;
            }

            self.transition(ScrapeState::FetchingPage)?;
            page += 1;
        }

        let terminal = if totals.saved_count > 0 {
            ScrapeState::Done
        } else {
            ScrapeState::Failed
        };
        self.transition(terminal)?;

        Ok(totals)
    }

    fn start_run(&mut self) -> Option<i64> {
        let config_hash = self.config_hash.as_deref()?;
        match self.store.start_run(config_hash) {
            Ok(run_id) => {
                tracing::debug!("Started run {}", run_id);
                Some(run_id)
            }
            Err(e) => {
                tracing::warn!("Could not record run start: {}", e);
                None
            }
        }
    }

    fn finish_run(&mut self, run_id: Option<i64>, status: RunStatus, totals: &RunTotals) {
        let Some(run_id) = run_id else {
            return;
        };
        if let Err(e) = self.store.finish_run(run_id, status, totals) {
            tracing::warn!("Could not record end of run {}: {}", run_id, e);
        }
    }
}

/// Runs a complete scrape against the configured catalog
///
/// # Arguments
///
/// * `config` - Validated configuration
/// * `store` - Storage handle the drafts are upserted into
/// * `config_hash` - Hash of the config file, recorded with the run
pub async fn run_scrape<B>(
    config: &Config,
    store: &mut B,
    config_hash: &str,
) -> Result<ScrapeSummary, BookFlowError>
where
    B: BookStore + ?Sized,
{
    let scraper = CatalogScraper::from_config(config)?;
    tracing::info!("Scraping catalog at {}", scraper.site().base_url());

    Orchestrator::new(scraper, store, config.storage.identity)
        .with_run_tracking(config_hash)
        .run()
        .await
}
