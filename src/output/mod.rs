//! Output module for catalog reports
//!
//! This module handles:
//! - Computing catalog statistics from stored books
//! - Generating the markdown catalog report
//! - Printing search results

mod markdown;
pub mod stats;
mod traits;

pub use markdown::{format_markdown_report, generate_markdown_report};
pub use stats::{compute_statistics, load_statistics, print_statistics, CatalogStatistics};
pub use traits::{CatalogReport, OutputError, OutputResult};

use crate::storage::{BookStore, StoredBook};

/// Builds the catalog report from storage
pub fn generate_report(store: &dyn BookStore, top_n: usize) -> OutputResult<CatalogReport> {
    let latest_run = store.get_latest_run()?;
    let books = store.list_books()?;

    Ok(CatalogReport {
        generated_at: chrono::Utc::now().to_rfc3339(),
        latest_run,
        statistics: compute_statistics(&books, top_n),
    })
}

/// Formats one book as a single listing line
pub fn format_book_line(book: &StoredBook) -> String {
    let mut line = format!("[{}] {} - {:.2}", book.id, book.title, book.price);
    if let Some(category) = &book.category {
        line.push_str(&format!(" ({})", category));
    }
    if let Some(rating) = book.rating {
        line.push_str(&format!(" {:.0}/5", rating));
    }
    if !book.available {
        line.push_str(" [out of stock]");
    }
    line
}

/// Prints a list of books, one per line
pub fn print_books(books: &[StoredBook]) {
    if books.is_empty() {
        println!("No matching books.");
        return;
    }
    for book in books {
        println!("{}", format_book_line(book));
    }
    println!("\n{} books", books.len());
}
