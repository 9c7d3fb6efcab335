//! Output module for crawl results
//!
//! This module handles:
//! - Writing deduplicated records as CSV
//! - Dumping raw page markup for offline inspection
//! - Recording and printing crawl statistics

mod csv_output;
mod html_dump;
pub mod stats;

pub use csv_output::{write_csv, write_csv_to, CSV_HEADER};
pub use html_dump::{write_html_dump, write_html_dump_to, RawPage};
pub use stats::{print_summary, CrawlSummary, TierStats};

use std::path::Path;
use thiserror::Error;

/// Errors that can occur while writing results
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Creates the parent directory of `path` if it has one
fn ensure_parent_dir(path: &Path) -> OutputResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
