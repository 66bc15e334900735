//! Book-Flow main entry point
//!
//! This is the command-line interface for the Book-Flow catalog scraper.

use anyhow::Context;
use book_flow::config::{load_config_with_hash, Config};
use book_flow::output::stats::DEFAULT_TOP_RATED;
use book_flow::site::CatalogSite;
use book_flow::storage::{open_storage, BookQuery, BookStore};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Book-Flow: a book catalog scraper
///
/// Book-Flow walks a paginated book catalog page by page, enriches every
/// listed book from its detail page, and upserts the results into SQLite.
#[derive(Parser, Debug)]
#[command(name = "book-flow")]
#[command(version = "1.0.0")]
#[command(about = "A book catalog scraper", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be scraped without scraping
    #[arg(long, conflicts_with_all = ["stats", "export_summary", "search", "category"])]
    dry_run: bool,

    /// Show catalog statistics from the database and exit
    #[arg(long, conflicts_with_all = ["dry_run", "export_summary", "search", "category"])]
    stats: bool,

    /// Write the markdown catalog report and exit
    #[arg(long, conflicts_with_all = ["dry_run", "stats", "search", "category"])]
    export_summary: bool,

    /// List stored books whose title contains TEXT
    #[arg(long, value_name = "TEXT")]
    search: Option<String>,

    /// List stored books whose category contains TEXT
    #[arg(long, value_name = "TEXT")]
    category: Option<String>,

    /// Lowest price to list (with --search/--category)
    #[arg(long)]
    min_price: Option<f64>,

    /// Highest price to list (with --search/--category)
    #[arg(long)]
    max_price: Option<f64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.dry_run {
        handle_dry_run(&config)
    } else if cli.stats {
        handle_stats(&config)
    } else if cli.export_summary {
        handle_export_summary(&config)
    } else if cli.search.is_some() || cli.category.is_some() {
        let query = BookQuery {
            title: cli.search,
            category: cli.category,
            min_price: cli.min_price,
            max_price: cli.max_price,
        };
        handle_search(&config, &query)
    } else {
        handle_scrape(&config, &config_hash).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("book_flow=info,warn"),
            1 => EnvFilter::new("book_flow=debug,info"),
            2 => EnvFilter::new("book_flow=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: validates config and shows the target URLs
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    let site = CatalogSite::new(&config.site.base_url)?;

    println!("=== Book-Flow Dry Run ===\n");

    println!("Site:");
    println!("  Base URL: {}", site.base_url());
    println!("  First page: {}", site.page_url(1)?);
    println!("  Following pages: {}", site.page_url(2)?);
    println!("  Listing timeout: {}s", config.site.listing_timeout_secs);
    println!("  Detail timeout: {}s", config.site.detail_timeout_secs);
    println!(
        "  Detail pages: {}",
        if config.site.fetch_details {
            "fetched"
        } else {
            "skipped"
        }
    );

    println!("\nUser Agent:");
    println!("  Name: {}", config.user_agent.crawler_name);
    println!("  Version: {}", config.user_agent.crawler_version);
    println!("  Contact URL: {}", config.user_agent.contact_url);
    println!("  Contact Email: {}", config.user_agent.contact_email);

    println!("\nStorage:");
    println!("  Database: {}", config.storage.database_path);
    println!("  Summary: {}", config.storage.summary_path);
    println!("  Identity: {:?}", config.storage.identity);

    println!("\n✓ Configuration is valid");

    Ok(())
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    use book_flow::output::{load_statistics, print_statistics};

    println!("Database: {}\n", config.storage.database_path);

    let storage = open_storage(Path::new(&config.storage.database_path))?;
    let stats = load_statistics(&storage, DEFAULT_TOP_RATED)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the --export-summary mode: writes the markdown catalog report
fn handle_export_summary(config: &Config) -> anyhow::Result<()> {
    use book_flow::output::{generate_markdown_report, generate_report};

    println!("=== Exporting Catalog Report ===\n");
    println!("Database: {}", config.storage.database_path);
    println!("Output: {}", config.storage.summary_path);
    println!();

    let storage = open_storage(Path::new(&config.storage.database_path))?;

    tracing::info!("Loading catalog from database...");
    let report = generate_report(&storage, DEFAULT_TOP_RATED)?;

    tracing::info!("Generating markdown report...");
    generate_markdown_report(&report, Path::new(&config.storage.summary_path))
        .with_context(|| format!("Failed to write {}", config.storage.summary_path))?;

    println!("✓ Report exported to: {}", config.storage.summary_path);

    Ok(())
}

/// Handles --search/--category: lists matching stored books
fn handle_search(config: &Config, query: &BookQuery) -> anyhow::Result<()> {
    let storage = open_storage(Path::new(&config.storage.database_path))?;
    let books = storage.search_books(query)?;
    book_flow::output::print_books(&books);
    Ok(())
}

/// Handles the main scrape operation
async fn handle_scrape(config: &Config, config_hash: &str) -> anyhow::Result<()> {
    let mut storage = open_storage(Path::new(&config.storage.database_path))?;

    match book_flow::run_scrape(config, &mut storage, config_hash).await {
        Ok(summary) => {
            println!("{}", summary.message);
            println!("  Pages processed: {}", summary.pages_processed);
            println!("  Books scraped: {}", summary.scraped_count);
            println!("  Books saved: {}", summary.saved_count);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Scrape failed: {}", e);
            Err(e.into())
        }
    }
}
