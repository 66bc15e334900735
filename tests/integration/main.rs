//! Integration tests for the scraper
//!
//! These tests use wiremock to serve a mock book catalog and drive the
//! page scraper and the full scrape loop end-to-end.

mod common;
mod pages_tests;
mod pipeline_tests;
