//! Crawl statistics
//!
//! Diagnostic counters gathered while crawling and printed alongside the output.

use crate::record::Level;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Counters for one traversal tier
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TierStats {
    /// Pages fetched and extracted successfully
    pub pages_visited: usize,

    /// Pages skipped because of fetch or extraction errors
    pub pages_skipped: usize,

    /// Pages not fetched because the crawl was cancelled
    pub pages_cancelled: usize,

    /// Records extracted before deduplication
    pub records_extracted: usize,

    /// Pages whose records came from the heuristic link fallback
    pub heuristic_pages: usize,

    /// Child pages discovered from this tier
    pub child_links: usize,
}

/// Summary of one crawl run
#[derive(Debug, Clone)]
pub struct CrawlSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub tiers: BTreeMap<Level, TierStats>,
    /// Records remaining after deduplication
    pub unique_records: usize,
    /// Records dropped as duplicates of an earlier record
    pub duplicates_dropped: usize,
    pub cancelled: bool,
}

impl CrawlSummary {
    /// Stats for a tier; tiers never reached report zeros
    pub fn tier(&self, level: Level) -> TierStats {
        self.tiers.get(&level).cloned().unwrap_or_default()
    }

    pub fn pages_visited(&self) -> usize {
        self.tiers.values().map(|t| t.pages_visited).sum()
    }

    pub fn pages_skipped(&self) -> usize {
        self.tiers.values().map(|t| t.pages_skipped).sum()
    }

    pub fn pages_cancelled(&self) -> usize {
        self.tiers.values().map(|t| t.pages_cancelled).sum()
    }

    pub fn records_extracted(&self) -> usize {
        self.tiers.values().map(|t| t.records_extracted).sum()
    }

    pub fn duration_seconds(&self) -> i64 {
        (self.finished_at - self.started_at).num_seconds()
    }

    /// Tiers where pages were visited but nothing was extracted
    ///
    /// This is what a markup change on the site usually looks like.
    pub fn degraded_tiers(&self) -> Vec<Level> {
        self.tiers
            .iter()
            .filter(|(_, t)| t.pages_visited > 0 && t.records_extracted == 0)
            .map(|(level, _)| *level)
            .collect()
    }
}

/// Prints a crawl summary to stdout in a formatted manner
pub fn print_summary(summary: &CrawlSummary) {
    println!("=== Crawl Summary ===\n");

    println!("Overview:");
    println!("  Pages visited: {}", summary.pages_visited());
    println!("  Pages skipped (errors): {}", summary.pages_skipped());
    if summary.cancelled {
        println!(
            "  Pages not fetched (cancelled): {}",
            summary.pages_cancelled()
        );
    }
    println!("  Records extracted: {}", summary.records_extracted());
    println!("  Unique records written: {}", summary.unique_records);
    println!("  Duplicates dropped: {}", summary.duplicates_dropped);
    println!("  Duration: {}s", summary.duration_seconds());
    println!();

    println!("By Tier:");
    for level in Level::ALL {
        let tier = summary.tier(level);
        println!(
            "  {:<5}: {} visited, {} skipped, {} records ({} pages via link fallback)",
            level,
            tier.pages_visited,
            tier.pages_skipped,
            tier.records_extracted,
            tier.heuristic_pages
        );
    }

    if summary.cancelled {
        println!("\nCrawl was cancelled; results are partial.");
    }
}
