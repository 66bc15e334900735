//! Page scraper: one listing page in, a list of drafts out
//!
//! The orchestrator only talks to [`CatalogSource`], so the loop can be
//! driven by the live site or by a stub in tests.

use crate::config::Config;
use crate::crawler::extract::{
    extract_detail_fields, has_next_control, parse_listing_page, parse_total_pages, DetailLookup,
    ListingItem,
};
use crate::crawler::fetcher::{build_http_client, FetchResult, PageFetcher, PageKind};
use crate::site::CatalogSite;
use crate::storage::DraftRecord;
use crate::BookFlowError;
use url::Url;

/// A paginated catalog that can be scraped page by page
///
/// None of these operations fail: a page that cannot be fetched or has no
/// items reads as empty, and a missing next control reads as the last page.
#[allow(async_fn_in_trait)]
pub trait CatalogSource {
    /// Scrapes one listing page; empty means "nothing more here"
    async fn scrape_page(&self, page: u32, total_pages_hint: u32) -> Vec<DraftRecord>;

    /// Returns true if `page` links to a following page
    async fn has_next_page(&self, page: u32) -> bool;

    /// Total page count shown by the catalog, or 0 if unknown
    async fn get_total_pages(&self) -> u32;
}

/// [`CatalogSource`] backed by the live catalog site
#[derive(Debug, Clone)]
pub struct CatalogScraper {
    fetcher: PageFetcher,
    site: CatalogSite,
    fetch_details: bool,
}

impl CatalogScraper {
    pub fn new(fetcher: PageFetcher, site: CatalogSite, fetch_details: bool) -> Self {
        Self {
            fetcher,
            site,
            fetch_details,
        }
    }

    /// Builds the HTTP client and site layout from configuration
    pub fn from_config(config: &Config) -> Result<Self, BookFlowError> {
        let client = build_http_client(&config.user_agent)?;
        let site = CatalogSite::new(&config.site.base_url)?;
        Ok(Self::new(
            PageFetcher::from_config(client, &config.site),
            site,
            config.site.fetch_details,
        ))
    }

    pub fn site(&self) -> &CatalogSite {
        &self.site
    }

    /// Fetches a listing page, logging why it is absent if it is
    async fn fetch_listing(&self, page: u32) -> Option<(Url, String)> {
        let url = match self.site.page_url(page) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!("Cannot build URL for page {}: {}", page, e);
                return None;
            }
        };

        match self.fetcher.fetch(url.as_str(), PageKind::Listing).await {
            FetchResult::Success { body, .. } => Some((url, body)),
            failed => {
                tracing::warn!(
                    "Page {} unavailable ({}): {}",
                    page,
                    url,
                    failed.failure_reason().unwrap_or_default()
                );
                None
            }
        }
    }

    /// Looks up category and author for one listing item
    async fn lookup_details(&self, item: &ListingItem) -> DetailLookup {
        if !self.fetch_details {
            return DetailLookup::Skipped;
        }
        let Some(detail_url) = &item.detail_url else {
            return DetailLookup::NoLink;
        };

        match self.fetcher.fetch(detail_url.as_str(), PageKind::Detail).await {
            FetchResult::Success { body, .. } => DetailLookup::Fetched(extract_detail_fields(&body)),
            failed => DetailLookup::Unavailable {
                url: detail_url.to_string(),
                reason: failed.failure_reason().unwrap_or_default(),
            },
        }
    }
}

impl CatalogSource for CatalogScraper {
    async fn scrape_page(&self, page: u32, total_pages_hint: u32) -> Vec<DraftRecord> {
        if total_pages_hint > 0 {
            tracing::info!("Scraping page {}/{}", page, total_pages_hint);
        } else {
            tracing::info!("Scraping page {}", page);
        }

        let Some((url, body)) = self.fetch_listing(page).await else {
            return Vec::new();
        };

        let listing = parse_listing_page(&body, &self.site);
        if listing.fragment_count == 0 {
            tracing::info!("No items found on page {} ({})", page, url);
            return Vec::new();
        }

        let dropped = listing.fragment_count - listing.items.len();
        if dropped > 0 {
            tracing::warn!("Dropped {} untitled items on page {}", dropped, page);
        }

        let mut drafts = Vec::with_capacity(listing.items.len());
        for item in listing.items {
            let lookup = self.lookup_details(&item).await;
            match &lookup {
                DetailLookup::Unavailable { url, reason } => {
                    tracing::warn!(
                        "Details for '{}' unavailable ({}): {}",
                        item.draft.title,
                        url,
                        reason
                    );
                }
                DetailLookup::NoLink => {
                    tracing::debug!("No detail link for '{}'", item.draft.title);
                }
                DetailLookup::Fetched(_) | DetailLookup::Skipped => {}
            }
            drafts.push(item.into_draft(lookup));
        }

        tracing::info!("Scraped {} books from page {}", drafts.len(), page);
        drafts
    }

    async fn has_next_page(&self, page: u32) -> bool {
        match self.fetch_listing(page).await {
            Some((_, body)) => has_next_control(&body),
            None => false,
        }
    }

    async fn get_total_pages(&self) -> u32 {
        match self.fetch_listing(1).await {
            Some((_, body)) => parse_total_pages(&body).unwrap_or(0),
            None => 0,
        }
    }
}
