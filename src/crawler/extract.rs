//! Field extraction for listing and detail pages
//!
//! Listing pages carry one `article.product_pod` fragment per item with the
//! title, price, star rating, stock status, cover image and detail link.
//! Detail pages add the category (from the breadcrumb trail) and the author
//! (from the product information table).
//!
//! Only the title is mandatory. Every other field degrades to a default or
//! to `None` instead of rejecting the item; an unparseable price becomes 0.0.

use crate::site::CatalogSite;
use crate::storage::DraftRecord;
use scraper::{ElementRef, Html, Selector};
use url::Url;

const ITEM_SELECTOR: &str = "article.product_pod";
const TITLE_LINK_SELECTOR: &str = "h3 a";
const PRICE_SELECTOR: &str = "p.price_color";
const RATING_SELECTOR: &str = "p.star-rating";
const AVAILABILITY_SELECTOR: &str = "p.instock, p.availability";
const IMAGE_SELECTOR: &str = "img";
const NEXT_SELECTOR: &str = "li.next";
const PAGER_CURRENT_SELECTOR: &str = "ul.pager li.current";
const BREADCRUMB_SELECTOR: &str = "ul.breadcrumb a";
const INFO_ROW_SELECTOR: &str = "article.product_page table tr";

/// Price text used when an item has no price element
const MISSING_PRICE: &str = "£0.00";

/// One listing item: its draft plus where to look for detail fields
#[derive(Debug, Clone, PartialEq)]
pub struct ListingItem {
    pub draft: DraftRecord,
    pub detail_url: Option<Url>,
}

/// Everything extracted from one listing page
#[derive(Debug, Clone, Default)]
pub struct ListingPage {
    /// Items that passed extraction, in document order
    pub items: Vec<ListingItem>,
    /// Number of item fragments found, including rejected ones
    pub fragment_count: usize,
    /// Whether the page shows a "next" pagination control
    pub has_next: bool,
    /// Total page count from the pager summary, if shown
    pub total_pages: Option<u32>,
}

/// Fields only available on an item's detail page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailFields {
    pub category: Option<String>,
    pub author: Option<String>,
}

/// How the detail lookup for one item went
///
/// The draft is kept in every case; only `Fetched` can contribute
/// a category or an author.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailLookup {
    /// The detail page was fetched and parsed
    Fetched(DetailFields),
    /// The detail page could not be fetched
    Unavailable { url: String, reason: String },
    /// The listing item had no usable detail link
    NoLink,
    /// Detail lookups are turned off
    Skipped,
}

impl DetailLookup {
    /// The detail fields this lookup produced; empty unless `Fetched`
    pub fn into_fields(self) -> DetailFields {
        match self {
            Self::Fetched(fields) => fields,
            _ => DetailFields::default(),
        }
    }

    /// Returns true if the draft got the full detail treatment
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Fetched(_))
    }
}

impl ListingItem {
    /// Merges the outcome of the detail lookup into the draft
    pub fn into_draft(self, lookup: DetailLookup) -> DraftRecord {
        let fields = lookup.into_fields();
        let mut draft = self.draft;
        draft.category = fields.category;
        draft.author = fields.author;
        draft
    }
}

fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn first_match<'a>(scope: ElementRef<'a>, css: &str) -> Option<ElementRef<'a>> {
    let sel = selector(css)?;
    let found = scope.select(&sel).next();
    found
}

/// Parses a currency-prefixed price
///
/// Every character that is not an ASCII digit or `.` is dropped before
/// parsing; anything that still fails to parse is 0.0.
///
/// ```
/// use book_flow::crawler::parse_price;
///
/// assert_eq!(parse_price("£51.77"), 51.77);
/// assert_eq!(parse_price("Â£13.99"), 13.99);
/// assert_eq!(parse_price("free"), 0.0);
/// ```
pub fn parse_price(price: &str) -> f64 {
    let cleaned: String = price
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    cleaned
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .unwrap_or(0.0)
}

/// Maps a star-rating word to its value
///
/// Matching is exact and case-sensitive: `"Three"` is 3.0, `"three"` is `None`.
pub fn parse_rating(word: &str) -> Option<f64> {
    match word {
        "One" => Some(1.0),
        "Two" => Some(2.0),
        "Three" => Some(3.0),
        "Four" => Some(4.0),
        "Five" => Some(5.0),
        _ => None,
    }
}

/// Decides stock status from an availability fragment
///
/// A missing fragment counts as available.
pub fn parse_availability(text: Option<&str>) -> bool {
    match text {
        Some(text) => text.to_lowercase().contains("in stock"),
        None => true,
    }
}

/// Picks the category out of a breadcrumb trail
///
/// The trail reads Home > Books > Category > ...; with three or more
/// segments the third is the category, with exactly two the second is used.
pub fn category_from_breadcrumb<S: AsRef<str>>(segments: &[S]) -> Option<String> {
    let picked = match segments.len() {
        0 | 1 => return None,
        2 => &segments[1],
        _ => &segments[2],
    };

    let category = picked.as_ref().trim();
    if category.is_empty() {
        None
    } else {
        Some(category.to_string())
    }
}

/// Extracts one listing item from its markup
///
/// Returns `None` when the item has no title.
pub fn extract_listing_item(item_markup: &str, site: &CatalogSite) -> Option<ListingItem> {
    let fragment = Html::parse_fragment(item_markup);
    listing_item_from_element(fragment.root_element(), site)
}

fn listing_item_from_element(item: ElementRef<'_>, site: &CatalogSite) -> Option<ListingItem> {
    let title_link = first_match(item, TITLE_LINK_SELECTOR);

    // The link text is a truncated display form; only the attribute holds the full title
    let title = title_link
        .and_then(|link| link.value().attr("title"))
        .map(str::trim)
        .filter(|t| !t.is_empty())?
        .to_string();

    let price_text = first_match(item, PRICE_SELECTOR)
        .map(element_text)
        .unwrap_or_else(|| MISSING_PRICE.to_string());
    let price = parse_price(&price_text);

    let rating = first_match(item, RATING_SELECTOR)
        .and_then(|el| el.value().classes().find_map(parse_rating));

    let availability = first_match(item, AVAILABILITY_SELECTOR).map(element_text);
    let available = parse_availability(availability.as_deref());

    let image = first_match(item, IMAGE_SELECTOR)
        .and_then(|img| img.value().attr("src"))
        .and_then(|src| site.resolve_image(src))
        .map(String::from);

    let detail_url = title_link
        .and_then(|link| link.value().attr("href"))
        .and_then(|href| site.resolve_detail_link(href));

    let mut draft = DraftRecord::new(title, price);
    draft.rating = rating;
    draft.available = available;
    draft.image = image;

    Some(ListingItem { draft, detail_url })
}

/// Extracts every item from a listing page, plus its pagination hints
pub fn parse_listing_page(html: &str, site: &CatalogSite) -> ListingPage {
    let document = Html::parse_document(html);
    let root = document.root_element();

    let mut page = ListingPage {
        has_next: first_match(root, NEXT_SELECTOR).is_some(),
        total_pages: pager_total(root),
        ..Default::default()
    };

    let Some(item_selector) = selector(ITEM_SELECTOR) else {
        return page;
    };

    for (index, fragment) in document.select(&item_selector).enumerate() {
        page.fragment_count += 1;
        match listing_item_from_element(fragment, site) {
            Some(item) => page.items.push(item),
            None => tracing::debug!("Dropping listing item {}: no title", index + 1),
        }
    }

    page
}

/// Returns true if the page shows a "next" pagination control
pub fn has_next_control(html: &str) -> bool {
    let document = Html::parse_document(html);
    first_match(document.root_element(), NEXT_SELECTOR).is_some()
}

/// Reads the total page count from a pager summary such as "Page 1 of 50"
pub fn parse_total_pages(html: &str) -> Option<u32> {
    let document = Html::parse_document(html);
    pager_total(document.root_element())
}

fn pager_total(root: ElementRef<'_>) -> Option<u32> {
    let summary = element_text(first_match(root, PAGER_CURRENT_SELECTOR)?);
    let mut words = summary.split_whitespace();
    words.find(|w| *w == "of")?;
    words.next()?.parse().ok()
}

/// Extracts category and author from a detail page
///
/// Missing pieces are simply `None`; this never fails.
pub fn extract_detail_fields(detail_markup: &str) -> DetailFields {
    let document = Html::parse_document(detail_markup);

    let category = selector(BREADCRUMB_SELECTOR).and_then(|sel| {
        let segments: Vec<String> = document.select(&sel).map(element_text).collect();
        category_from_breadcrumb(&segments)
    });

    let author = selector(INFO_ROW_SELECTOR).and_then(|sel| {
        document.select(&sel).find_map(|row| {
            let key = element_text(first_match(row, "th")?);
            if !key.to_lowercase().contains("author") {
                return None;
            }
            let value = element_text(first_match(row, "td")?);
            (!value.is_empty()).then_some(value)
        })
    });

    DetailFields { category, author }
}
