use crate::storage::IdentityPolicy;
use serde::Deserialize;

/// Default catalog root (the public books demo site)
pub const DEFAULT_BASE_URL: &str = "https://books.toscrape.com/";

/// Main configuration structure for Book-Flow
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub storage: StorageConfig,
}

/// Catalog site and fetch behavior
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Root URL of the catalog; page 1 is `index.html` under it
    #[serde(rename = "base-url", default = "default_base_url")]
    pub base_url: String,

    /// Timeout for listing page requests (seconds)
    #[serde(rename = "listing-timeout-secs", default = "default_listing_timeout")]
    pub listing_timeout_secs: u64,

    /// Timeout for detail page requests (seconds)
    #[serde(rename = "detail-timeout-secs", default = "default_detail_timeout")]
    pub detail_timeout_secs: u64,

    /// Whether to visit each item's detail page for category and author
    #[serde(rename = "fetch-details", default = "default_fetch_details")]
    pub fetch_details: bool,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            listing_timeout_secs: default_listing_timeout(),
            detail_timeout_secs: default_detail_timeout(),
            fetch_details: default_fetch_details(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_listing_timeout() -> u64 {
    10
}

fn default_detail_timeout() -> u64 {
    5
}

fn default_fetch_details() -> bool {
    true
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

/// Storage and report output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,

    /// Path to the markdown catalog report
    #[serde(rename = "summary-path")]
    pub summary_path: String,

    /// Which fields decide insert-vs-update during upsert
    #[serde(default)]
    pub identity: IdentityPolicy,
}
