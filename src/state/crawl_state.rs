use crate::crawler::{Aggregator, CrawlOutcome};
use crate::extract::Strategy;
use crate::output::{CrawlSummary, RawPage, TierStats};
use crate::record::{Level, Record};
use crate::state::{PageVisit, VisitOutcome};
use crate::url::canonical_key;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashSet};
use url::Url;

/// Process-scoped state of one crawl run
///
/// Created empty when the crawl starts and consumed by [`CrawlState::finish`];
/// nothing survives between runs.
#[derive(Debug)]
pub struct CrawlState {
    /// Canonical URLs already claimed for fetching
    visited: HashSet<String>,

    /// State pages discovered on the index, in discovery order
    state_urls: Vec<Url>,

    /// City pages discovered on state pages, in discovery order
    city_urls: Vec<Url>,

    aggregator: Aggregator,

    tiers: BTreeMap<Level, TierStats>,

    /// Markup of fetched pages, kept only when a dump was requested
    raw_pages: Option<Vec<RawPage>>,

    started_at: DateTime<Utc>,
}

impl CrawlState {
    pub fn new(keep_markup: bool) -> Self {
        Self {
            visited: HashSet::new(),
            state_urls: Vec::new(),
            city_urls: Vec::new(),
            aggregator: Aggregator::new(),
            tiers: BTreeMap::new(),
            raw_pages: keep_markup.then(Vec::new),
            started_at: Utc::now(),
        }
    }

    /// Marks a URL as visited; returns false if it was already claimed
    pub fn claim(&mut self, url: &Url) -> bool {
        self.visited.insert(canonical_key(url.as_str()))
    }

    /// Claims newly discovered pages of `level`, returning the ones not seen before
    ///
    /// Order is preserved, so the returned URLs are in discovery order.
    pub fn claim_children(&mut self, level: Level, links: Vec<Url>) -> Vec<Url> {
        let fresh: Vec<Url> = links.into_iter().filter(|url| self.claim(url)).collect();

        match level {
            Level::State => self.state_urls.extend(fresh.iter().cloned()),
            Level::City => self.city_urls.extend(fresh.iter().cloned()),
            Level::Index => {}
        }

        fresh
    }

    pub fn aggregator(&self) -> &Aggregator {
        &self.aggregator
    }

    pub fn tier(&self, level: Level) -> TierStats {
        self.tiers.get(&level).cloned().unwrap_or_default()
    }

    /// Folds one page visit and its records into the crawl
    pub fn record_visit(&mut self, visit: PageVisit, records: Vec<Record>) {
        let tier = self.tiers.entry(visit.level).or_default();

        match &visit.outcome {
            VisitOutcome::Extracted {
                records: count,
                strategy,
                child_links,
            } => {
                tracing::debug!(
                    "Visited {} page {}: {} records ({:?}), {} child links",
                    visit.level,
                    visit.url,
                    count,
                    strategy,
                    child_links
                );
                tier.pages_visited += 1;
                tier.records_extracted += records.len();
                tier.child_links += child_links;
                if *strategy == Strategy::Heuristic {
                    tier.heuristic_pages += 1;
                }
            }
            VisitOutcome::Failed(failure) => {
                tracing::warn!("Skipping {} page {}: {}", visit.level, visit.url, failure);
                tier.pages_skipped += 1;
            }
            VisitOutcome::Cancelled => {
                tracing::debug!("Not fetching {} (crawl cancelled)", visit.url);
                tier.pages_cancelled += 1;
            }
        }

        self.aggregator.extend(records);
    }

    /// Keeps a page's markup for the raw dump, if one was requested
    pub fn retain_markup(&mut self, level: Level, url: &Url, markup: &str) {
        if let Some(pages) = self.raw_pages.as_mut() {
            pages.push(RawPage {
                level,
                url: url.to_string(),
                markup: markup.to_string(),
            });
        }
    }

    /// Ends the run, producing the final record set and its summary
    pub fn finish(self, cancelled: bool) -> CrawlOutcome {
        tracing::info!(
            "Discovered {} state pages and {} city pages",
            self.state_urls.len(),
            self.city_urls.len()
        );
        let received = self.aggregator.received();
        let records = self.aggregator.finish();
        let summary = CrawlSummary {
            started_at: self.started_at,
            finished_at: Utc::now(),
            tiers: self.tiers,
            unique_records: records.len(),
            duplicates_dropped: received - records.len(),
            cancelled,
        };

        CrawlOutcome {
            records,
            summary,
            raw_pages: self.raw_pages.unwrap_or_default(),
        }
    }
}
