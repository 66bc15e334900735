//! Catalog URL layout
//!
//! The catalog serves its first listing page at `index.html` under the site
//! root and every later page at `catalogue/page-{N}.html`. Listing items link
//! to detail pages with hrefs relative to whichever page they appear on, so
//! this module also normalizes those links back onto the site.

use url::{ParseError, Url};

/// Directory holding the numbered listing pages and the detail pages
const CATALOGUE_DIR: &str = "catalogue/";

/// URL layout of one catalog site
#[derive(Debug, Clone)]
pub struct CatalogSite {
    base: Url,
    catalogue: Url,
}

impl CatalogSite {
    /// Creates the layout rooted at `base_url`
    ///
    /// A trailing slash is added when missing so relative joins land under
    /// the root instead of replacing its last path segment.
    ///
    /// # Example
    ///
    /// ```
    /// use book_flow::site::CatalogSite;
    ///
    /// let site = CatalogSite::new("https://books.toscrape.com").unwrap();
    /// assert_eq!(site.page_url(1).unwrap().as_str(), "https://books.toscrape.com/index.html");
    /// assert_eq!(
    ///     site.page_url(3).unwrap().as_str(),
    ///     "https://books.toscrape.com/catalogue/page-3.html"
    /// );
    /// ```
    pub fn new(base_url: &str) -> Result<Self, ParseError> {
        let mut base = Url::parse(base_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let catalogue = base.join(CATALOGUE_DIR)?;
        Ok(Self { base, catalogue })
    }

    /// The site root every relative image path is resolved against
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// The index page, which doubles as listing page 1
    pub fn index_url(&self) -> Result<Url, ParseError> {
        self.base.join("index.html")
    }

    /// URL of listing page `page` (1-based)
    pub fn page_url(&self, page: u32) -> Result<Url, ParseError> {
        if page <= 1 {
            self.index_url()
        } else {
            self.catalogue.join(&format!("page-{}.html", page))
        }
    }

    /// Resolves a listing item's detail-page href to an absolute URL
    ///
    /// Hrefs seen on the index page start with `catalogue/`; hrefs on later
    /// pages are relative to the catalogue directory, and some are written
    /// with leading `../` segments that climb back to the root.
    pub fn resolve_detail_link(&self, href: &str) -> Option<Url> {
        let href = href.trim();
        if !is_followable(href) {
            return None;
        }

        let resolved = if href.starts_with("..") {
            self.base.join(&href.replace("../", ""))
        } else if href.starts_with(CATALOGUE_DIR) {
            self.base.join(href)
        } else {
            self.catalogue.join(href)
        };

        resolved.ok().filter(is_http)
    }

    /// Resolves a cover image path against the site root
    pub fn resolve_image(&self, src: &str) -> Option<Url> {
        let src = src.trim();
        if !is_followable(src) {
            return None;
        }
        self.base.join(src).ok().filter(is_http)
    }
}

/// Rejects empty, fragment-only and non-navigational hrefs
fn is_followable(href: &str) -> bool {
    !(href.is_empty()
        || href.starts_with('#')
        || href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:"))
}

fn is_http(url: &Url) -> bool {
    url.scheme() == "http" || url.scheme() == "https"
}
