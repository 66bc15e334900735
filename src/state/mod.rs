//! State module for tracking scrape progress
//!
//! - `ScrapeState`: the orchestrator's page-loop state machine

mod scrape_state;

pub use scrape_state::ScrapeState;
