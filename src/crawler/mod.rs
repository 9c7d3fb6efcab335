//! Crawler module for page fetching and traversal
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with retry logic
//! - The three-tier traversal and its concurrency bound
//! - Record aggregation and deduplication
//! - Writing results once the traversal ends

mod aggregator;
mod coordinator;
mod fetcher;

pub use aggregator::{aggregate, Aggregator};
pub use coordinator::{Coordinator, CrawlOutcome};
pub use fetcher::{build_http_client, fetch_url, FetchedPage, Fetcher, HttpFetcher};

use crate::config::Config;
use crate::output::{write_csv, write_html_dump};
use crate::CrawlError;
use std::path::Path;
use tokio_util::sync::CancellationToken;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Build the HTTP fetcher and coordinator
/// 2. Arm the overall crawl deadline, if configured
/// 3. Traverse index, state and city pages
/// 4. Write the deduplicated records as CSV
/// 5. Write the raw markup dump, if configured
///
/// Cancelling `cancel` ends the traversal early; whatever was collected is
/// still written.
///
/// # Returns
///
/// * `Ok(CrawlOutcome)` - Crawl completed, possibly partially
/// * `Err(CrawlError)` - The index page was unavailable or the CSV could not be written
pub async fn run_crawl(config: Config, cancel: CancellationToken) -> Result<CrawlOutcome, CrawlError> {
    let coordinator = Coordinator::new(config)?;
    run_with(&coordinator, cancel).await
}

/// Runs a crawl with a prepared coordinator and writes its outputs
pub async fn run_with(
    coordinator: &Coordinator,
    cancel: CancellationToken,
) -> Result<CrawlOutcome, CrawlError> {
    let config = coordinator.config();
    let crawl_token = cancel.child_token();

    let deadline = config.crawler.crawl_timeout().map(|limit| {
        let token = crawl_token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(limit).await;
            tracing::warn!("Crawl deadline of {:?} reached, cancelling", limit);
            token.cancel();
        })
    });

    let result = coordinator.run(&crawl_token).await;
    if let Some(handle) = deadline {
        handle.abort();
    }
    let outcome = result?;

    let csv_path = Path::new(&config.output.csv_path);
    write_csv(&outcome.records, csv_path)?;
    tracing::info!(
        "Wrote {} records to {}",
        outcome.records.len(),
        csv_path.display()
    );

    if let Some(dump_path) = &config.output.dump_html_path {
        let dump_path = Path::new(dump_path);
        match write_html_dump(&outcome.raw_pages, dump_path) {
            Ok(()) => tracing::info!(
                "Wrote {} raw pages to {}",
                outcome.raw_pages.len(),
                dump_path.display()
            ),
            Err(e) => tracing::warn!("Failed to write HTML dump {}: {}", dump_path.display(), e),
        }
    }

    if outcome.records.is_empty() {
        tracing::warn!(
            "No records were extracted; rerun with --dump-html to inspect the fetched markup"
        );
    }

    Ok(outcome)
}
