//! Crawler module for catalog scraping
//!
//! This module contains the scraping pipeline:
//! - HTTP fetching with per-page-kind timeouts
//! - Field extraction from listing and detail pages
//! - Page-by-page scraping behind the `CatalogSource` trait
//! - The orchestrating page loop

mod extract;
mod fetcher;
mod orchestrator;
mod pages;

pub use extract::{
    category_from_breadcrumb, extract_detail_fields, extract_listing_item, has_next_control,
    parse_availability, parse_listing_page, parse_price, parse_rating, parse_total_pages,
    DetailFields, DetailLookup, ListingItem, ListingPage,
};
pub use fetcher::{build_http_client, fetch_url, FetchResult, PageFetcher, PageKind};
pub use orchestrator::{run_scrape, Orchestrator, ScrapeSummary, SUCCESS_MESSAGE};
pub use pages::{CatalogScraper, CatalogSource};
