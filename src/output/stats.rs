//! Catalog statistics
//!
//! Everything is computed in one pass over the stored books, so any
//! [`BookStore`] can back it.

use crate::output::traits::OutputResult;
use crate::storage::{BookStore, StoredBook};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Number of books listed in the top-rated ranking
pub const DEFAULT_TOP_RATED: usize = 10;

/// Per-category totals
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryStats {
    /// `None` collects books whose detail page gave no category
    pub category: Option<String>,
    pub book_count: u64,
    /// Mean price, rounded to 2 decimals
    pub average_price: f64,
}

/// One entry in the top-rated ranking
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatedBook {
    pub id: i64,
    pub title: String,
    pub rating: f64,
}

/// Catalog statistics summary
#[derive(Debug, Clone, Default, Serialize)]
pub struct CatalogStatistics {
    /// Total number of stored books
    pub total_books: u64,

    /// Mean price over all books; 0.0 for an empty catalog
    pub average_price: f64,

    /// Books per star rating (unrated books are not counted)
    pub rating_distribution: BTreeMap<u8, u64>,

    /// Books currently in stock
    pub available_books: u64,

    /// Totals per category, sorted by name with uncategorized last
    pub categories: Vec<CategoryStats>,

    /// Highest-rated books, best first
    pub top_rated: Vec<RatedBook>,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Computes statistics over a list of books
pub fn compute_statistics(books: &[StoredBook], top_n: usize) -> CatalogStatistics {
    let mut stats = CatalogStatistics {
        total_books: books.len() as u64,
        ..Default::default()
    };
    if books.is_empty() {
        return stats;
    }

    let mut price_sum = 0.0;
    let mut per_category: HashMap<Option<&str>, (u64, f64)> = HashMap::new();

    for book in books {
        price_sum += book.price;
        if book.available {
            stats.available_books += 1;
        }
        if let Some(rating) = book.rating {
            *stats
                .rating_distribution
                .entry(rating.round() as u8)
                .or_insert(0) += 1;
        }

        let entry = per_category
            .entry(book.category.as_deref())
            .or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += book.price;
    }

    stats.average_price = price_sum / books.len() as f64;

    stats.categories = per_category
        .into_iter()
        .map(|(category, (count, total))| CategoryStats {
            category: category.map(String::from),
            book_count: count,
            average_price: round2(total / count as f64),
        })
        .collect();
    stats
        .categories
        .sort_by(|a, b| match (&a.category, &b.category) {
            (Some(a), Some(b)) => a.cmp(b),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });

    stats.top_rated = top_rated(books, top_n);

    stats
}

/// Returns up to `limit` rated books, highest rating first
///
/// Books with equal ratings keep their stored order.
pub fn top_rated(books: &[StoredBook], limit: usize) -> Vec<RatedBook> {
    let mut rated: Vec<RatedBook> = books
        .iter()
        .filter_map(|book| {
            book.rating.map(|rating| RatedBook {
                id: book.id,
                title: book.title.clone(),
                rating,
            })
        })
        .collect();

    rated.sort_by(|a, b| b.rating.total_cmp(&a.rating));
    rated.truncate(limit);
    rated
}

/// Loads statistics from storage
pub fn load_statistics(store: &dyn BookStore, top_n: usize) -> OutputResult<CatalogStatistics> {
    let books = store.list_books()?;
    Ok(compute_statistics(&books, top_n))
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CatalogStatistics) {
    println!("=== Catalog Statistics ===\n");

    println!("Overview:");
    println!("  Total books: {}", stats.total_books);
    println!("  Average price: {:.2}", stats.average_price);
    println!("  In stock: {}", stats.available_books);
    println!();

    if !stats.rating_distribution.is_empty() {
        println!("Ratings:");
        for (stars, count) in stats.rating_distribution.iter().rev() {
            let percentage = (*count as f64 / stats.total_books as f64) * 100.0;
            println!("  {} stars: {} ({:.1}%)", stars, count, percentage);
        }
        println!();
    }

    if !stats.categories.is_empty() {
        println!("Categories ({}):", stats.categories.len());
        for category in &stats.categories {
            println!(
                "  {}: {} books, average {:.2}",
                category.category.as_deref().unwrap_or("(uncategorized)"),
                category.book_count,
                category.average_price
            );
        }
        println!();
    }

    if !stats.top_rated.is_empty() {
        println!("Top Rated:");
        for (rank, book) in stats.top_rated.iter().enumerate() {
            println!("  {}. {} ({:.1})", rank + 1, book.title, book.rating);
        }
    }
}
