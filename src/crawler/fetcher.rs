//! HTTP fetcher implementation
//!
//! One GET per listing or detail page, bounded by a per-request timeout.
//! There are no retries: any transport error or non-success status makes
//! the page absent, and the caller moves on.

use crate::config::{SiteConfig, UserAgentConfig};
use reqwest::{redirect::Policy, Client};
use std::time::Duration;

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// Successfully fetched the page
    Success {
        /// Final URL after redirects
        final_url: String,
        /// HTTP status code
        status_code: u16,
        /// Page body content
        body: String,
    },

    /// The server answered with a non-success status
    HttpError {
        /// The HTTP status code
        status_code: u16,
    },

    /// Network error (connection refused, timeout, DNS failure, body read failure)
    NetworkError {
        /// Error description
        error: String,
    },
}

impl FetchResult {
    /// Returns the body of a successful fetch
    pub fn into_body(self) -> Option<String> {
        match self {
            Self::Success { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Describes why the page is absent, or `None` for a successful fetch
    pub fn failure_reason(&self) -> Option<String> {
        match self {
            Self::Success { .. } => None,
            Self::HttpError { status_code } => Some(format!("HTTP {}", status_code)),
            Self::NetworkError { error } => Some(error.clone()),
        }
    }
}

/// Which kind of page is being requested; decides the timeout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    /// A catalog listing page
    Listing,
    /// An item detail page (best-effort enrichment)
    Detail,
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use book_flow::config::UserAgentConfig;
/// use book_flow::crawler::build_http_client;
///
/// let config = UserAgentConfig {
///     crawler_name: "BookFlow".to_string(),
///     crawler_version: "1.0".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "admin@example.com".to_string(),
/// };
///
/// let client = build_http_client(&config).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    // Format: CrawlerName/Version (+ContactURL; ContactEmail)
    let user_agent = format!(
        "{}/{} (+{}; {})",
        config.crawler_name, config.crawler_version, config.contact_url, config.contact_email
    );

    Client::builder()
        .user_agent(user_agent)
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Page fetcher with separate listing and detail timeouts
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: Client,
    listing_timeout: Duration,
    detail_timeout: Duration,
}

impl PageFetcher {
    /// Creates a fetcher over an existing client
    pub fn new(client: Client, listing_timeout: Duration, detail_timeout: Duration) -> Self {
        Self {
            client,
            listing_timeout,
            detail_timeout,
        }
    }

    /// Creates a fetcher using the timeouts from the site configuration
    pub fn from_config(client: Client, site: &SiteConfig) -> Self {
        Self::new(
            client,
            Duration::from_secs(site.listing_timeout_secs),
            Duration::from_secs(site.detail_timeout_secs),
        )
    }

    /// The timeout applied to requests of `kind`
    pub fn timeout_for(&self, kind: PageKind) -> Duration {
        match kind {
            PageKind::Listing => self.listing_timeout,
            PageKind::Detail => self.detail_timeout,
        }
    }

    /// Fetches one page
    pub async fn fetch(&self, url: &str, kind: PageKind) -> FetchResult {
        fetch_url(&self.client, url, self.timeout_for(kind)).await
    }
}

/// Fetches a URL once with the given timeout
///
/// | Condition | Result |
/// |-----------|--------|
/// | 2xx | `Success` with the body |
/// | Any other status | `HttpError` |
/// | Timeout, DNS, connect, body read failure | `NetworkError` |
pub async fn fetch_url(client: &Client, url: &str, timeout: Duration) -> FetchResult {
    match client.get(url).timeout(timeout).send().await {
        Ok(response) => {
            let status = response.status();
            let final_url = response.url().to_string();

            if !status.is_success() {
                return FetchResult::HttpError {
                    status_code: status.as_u16(),
                };
            }

            match response.text().await {
                Ok(body) => FetchResult::Success {
                    final_url,
                    status_code: status.as_u16(),
                    body,
                },
                Err(e) => FetchResult::NetworkError {
                    error: e.to_string(),
                },
            }
        }
        Err(e) => {
            let error = if e.is_timeout() {
                "Request timeout".to_string()
            } else if e.is_connect() {
                "Connection refused".to_string()
            } else {
                e.to_string()
            };
            FetchResult::NetworkError { error }
        }
    }
}
