//! Markdown catalog report
//!
//! Renders the latest scrape run and the catalog statistics as a
//! human-readable markdown document.

use crate::output::traits::{CatalogReport, OutputResult};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes the catalog report to `output_path`
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote the report
/// * `Err(OutputError)` - Failed to write the report
pub fn generate_markdown_report(report: &CatalogReport, output_path: &Path) -> OutputResult<()> {
    let markdown = format_markdown_report(report);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats the catalog report as markdown
pub fn format_markdown_report(report: &CatalogReport) -> String {
    let stats = &report.statistics;
    let mut md = String::new();

    md.push_str("# Book-Flow Catalog Report\n\n");
    md.push_str(&format!("Generated: {}\n\n", report.generated_at));

    // Latest run
    md.push_str("## Latest Scrape Run\n\n");
    match &report.latest_run {
        Some(run) => {
            md.push_str(&format!("- **Run ID**: {}\n", run.id));
            md.push_str(&format!("- **Started**: {}\n", run.started_at));
            if let Some(finished) = &run.finished_at {
                md.push_str(&format!("- **Finished**: {}\n", finished));
            }
            if let Some(duration) = report.run_duration_seconds() {
                md.push_str(&format!("- **Duration**: {} seconds\n", duration));
            }
            md.push_str(&format!("- **Status**: {}\n", run.status.to_db_string()));
            md.push_str(&format!("- **Config Hash**: {}\n", run.config_hash));
            md.push_str(&format!(
                "- **Pages Processed**: {}\n",
                run.totals.pages_processed
            ));
            md.push_str(&format!("- **Books Scraped**: {}\n", run.totals.scraped_count));
            md.push_str(&format!("- **Books Saved**: {}\n", run.totals.saved_count));
            if let Some(rate) = report.save_rate() {
                md.push_str(&format!("- **Save Rate**: {:.2}%\n", rate));
            }
            md.push('\n');
        }
        None => md.push_str("No scrape runs recorded.\n\n"),
    }

    // Overview
    md.push_str("## Catalog Overview\n\n");
    md.push_str(&format!("- **Total Books**: {}\n", stats.total_books));
    md.push_str(&format!("- **Average Price**: {:.2}\n", stats.average_price));
    md.push_str(&format!("- **In Stock**: {}\n\n", stats.available_books));

    if !stats.rating_distribution.is_empty() {
        md.push_str("## Rating Distribution\n\n");
        md.push_str("| Stars | Books |\n");
        md.push_str("|-------|-------|\n");
        for (stars, count) in stats.rating_distribution.iter().rev() {
            md.push_str(&format!("| {} | {} |\n", stars, count));
        }
        md.push('\n');
    }

    if !stats.categories.is_empty() {
        md.push_str("## Categories\n\n");
        md.push_str("| Category | Books | Average Price |\n");
        md.push_str("|----------|-------|---------------|\n");
        for category in &stats.categories {
            md.push_str(&format!(
                "| {} | {} | {:.2} |\n",
                category.category.as_deref().unwrap_or("(uncategorized)"),
                category.book_count,
                category.average_price
            ));
        }
        md.push('\n');
    }

    if !stats.top_rated.is_empty() {
        md.push_str(&format!("## Top {} Rated\n\n", stats.top_rated.len()));
        md.push_str("| # | Title | Rating |\n");
        md.push_str("|---|-------|--------|\n");
        for (rank, book) in stats.top_rated.iter().enumerate() {
            md.push_str(&format!(
                "| {} | {} | {:.1} |\n",
                rank + 1,
                escape_cell(&book.title),
                book.rating
            ));
        }
        md.push('\n');
    }

    md
}

/// Keeps titles containing `|` from breaking the table
fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}
