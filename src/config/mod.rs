//! Book-Flow configuration
//!
//! A TOML file with three sections: `[site]` (catalog root, timeouts and
//! detail-page enrichment), `[user-agent]` and `[storage]`. `[site]` may be
//! omitted entirely to scrape the public demo catalog with default timeouts.
//! Loading always validates; the SHA-256 of the raw file is recorded with
//! every scrape run.
//!
//! ```no_run
//! use book_flow::config::load_config_with_hash;
//! use std::path::Path;
//!
//! let (config, hash) = load_config_with_hash(Path::new("book-flow.toml")).unwrap();
//! println!("{} ({})", config.site.base_url, hash);
//! ```

mod parser;
mod types;
mod validation;

pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use types::{Config, SiteConfig, StorageConfig, UserAgentConfig, DEFAULT_BASE_URL};
pub use validation::validate;
