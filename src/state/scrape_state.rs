/// Scrape run state definitions
///
/// The orchestrator walks these states once per listing page and ends in
/// exactly one terminal state.
use std::fmt;

/// Represents where a scrape run currently is in its page loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScrapeState {
    // ===== Setup =====
    /// Run created, no page requested yet
    Init,

    // ===== Page Loop =====
    /// Fetching and extracting a listing page
    FetchingPage,

    /// Persisting the drafts extracted from the current page
    SavingPage,

    /// Asking the site whether another listing page follows
    CheckingNext,

    // ===== Terminal States =====
    /// Loop ended and at least one book was saved
    Done,

    /// Loop ended without saving anything
    Failed,
}

impl ScrapeState {
    /// Returns true if the run has finished
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// Returns true if `next` is a legal successor of this state
    ///
    /// The loop exits either when a page comes back empty or when no next
    /// page exists; the terminal state chosen depends on whether anything
    /// was saved over the whole run.
    pub fn can_transition_to(&self, next: ScrapeState) -> bool {
        use ScrapeState::*;
        matches!(
            (*self, next),
            (Init, FetchingPage)
                | (FetchingPage, SavingPage)
                | (FetchingPage, Done)
                | (FetchingPage, Failed)
                | (SavingPage, CheckingNext)
                | (CheckingNext, FetchingPage)
                | (CheckingNext, Done)
                | (CheckingNext, Failed)
        )
    }
}

impl fmt::Display for ScrapeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Init => "init",
            Self::FetchingPage => "fetching_page",
            Self::SavingPage => "saving_page",
            Self::CheckingNext => "checking_next",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}
