//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the three-tier traversal:
//! - Fetching the index page (fatal if it cannot be obtained)
//! - Fetching each tier batch with bounded, order-preserving concurrency
//! - Running extraction and child discovery on every fetched page
//! - Folding results into the crawl state in depth-first visit order
//! - Honoring cancellation between and during fetches

use crate::config::Config;
use crate::crawler::{FetchedPage, Fetcher, HttpFetcher};
use crate::extract::{default_extractor, discover_child_links, DefaultExtractor, Page};
use crate::output::{CrawlSummary, RawPage};
use crate::record::{Level, Record};
use crate::state::{CrawlState, PageVisit};
use crate::url::SiteLayout;
use crate::{CrawlError, ExtractionError, FetchError, UrlError};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Everything a finished crawl produced
#[derive(Debug)]
pub struct CrawlOutcome {
    /// Deduplicated records in visit order
    pub records: Vec<Record>,
    pub summary: CrawlSummary,
    /// Markup of every fetched page, empty unless a dump was requested
    pub raw_pages: Vec<RawPage>,
}

/// Result of one fetch within a tier batch
enum TierFetch {
    Page(FetchedPage),
    Failed(FetchError),
    Cancelled,
}

/// Main crawler coordinator structure
pub struct Coordinator {
    config: Arc<Config>,
    root: Url,
    layout: SiteLayout,
    fetcher: Arc<dyn Fetcher>,
    extractor: DefaultExtractor,
}

impl Coordinator {
    /// Creates a coordinator that fetches over HTTP
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(CrawlError)` - The root URL is unusable or the HTTP client failed to build
    pub fn new(config: Config) -> Result<Self, CrawlError> {
        let fetcher = HttpFetcher::new(&config)?;
        Self::with_fetcher(config, Arc::new(fetcher))
    }

    /// Creates a coordinator around any fetcher
    pub fn with_fetcher(config: Config, fetcher: Arc<dyn Fetcher>) -> Result<Self, CrawlError> {
        let root = Url::parse(config.crawler.root_url.trim())
            .map_err(|e| UrlError::Parse(format!("{}: {}", config.crawler.root_url, e)))?;
        let layout = SiteLayout::from_root(&root)?;
        let extractor = default_extractor(&layout);

        Ok(Self {
            config: Arc::new(config),
            root,
            layout,
            fetcher,
            extractor,
        })
    }

    pub fn layout(&self) -> &SiteLayout {
        &self.layout
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Runs the crawl to completion or cancellation
    ///
    /// Pages are visited depth-first: the index, then each state followed by
    /// its cities. Records reach the aggregate in that order regardless of the
    /// order in which concurrent fetches complete.
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlOutcome)` - The crawl finished, possibly partially
    /// * `Err(CrawlError::IndexUnavailable)` - The index page could not be fetched or parsed
    /// * `Err(CrawlError::Cancelled)` - Cancelled before the index page arrived
    pub async fn run(&self, cancel: &CancellationToken) -> Result<CrawlOutcome, CrawlError> {
        let mut state = CrawlState::new(self.config.output.dump_html_path.is_some());
        state.claim(&self.root);

        tracing::info!("Fetching index page {}", self.root);
        let fetched = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(CrawlError::Cancelled),
            result = self.fetcher.fetch(&self.root) => result,
        };

        let index = fetched.map_err(|e| self.index_unavailable(e.to_string()))?;
        let state_links = self
            .process_page(&mut state, &self.root, Level::Index, &index)
            .map_err(|e| self.index_unavailable(e.to_string()))?;

        let state_urls = state.claim_children(Level::State, state_links);
        tracing::info!("Discovered {} state pages", state_urls.len());

        let state_pages = self.fetch_tier(&state_urls, cancel).await;
        for (state_url, fetched) in state_pages {
            let city_links = self.visit(&mut state, state_url, Level::State, fetched);

            let city_urls = state.claim_children(Level::City, city_links);
            if city_urls.is_empty() {
                continue;
            }
            tracing::debug!("Fetching {} city pages", city_urls.len());

            let city_pages = self.fetch_tier(&city_urls, cancel).await;
            for (city_url, fetched) in city_pages {
                self.visit(&mut state, city_url, Level::City, fetched);
            }
        }

        let cancelled = cancel.is_cancelled();
        if cancelled {
            tracing::warn!("Crawl cancelled; keeping {} records", state.aggregator().len());
        }

        let outcome = state.finish(cancelled);
        for level in outcome.summary.degraded_tiers() {
            // Index pages normally carry navigation only
            if level != Level::Index {
                tracing::warn!(
                    "No records extracted from any {} page; the site's markup may have changed",
                    level
                );
            }
        }

        tracing::info!(
            "Crawl finished: {} pages visited, {} skipped, {} unique records",
            outcome.summary.pages_visited(),
            outcome.summary.pages_skipped(),
            outcome.summary.unique_records
        );

        Ok(outcome)
    }

    fn index_unavailable(&self, reason: String) -> CrawlError {
        CrawlError::IndexUnavailable {
            url: self.root.to_string(),
            reason,
        }
    }

    /// Fetches a batch of same-tier pages concurrently
    ///
    /// At most `concurrency-limit` fetches are in flight. Results come back in
    /// the order of `urls`. Once `cancel` fires, pending fetches are not started
    /// and in-flight ones are abandoned.
    async fn fetch_tier(&self, urls: &[Url], cancel: &CancellationToken) -> Vec<(Url, TierFetch)> {
        let limit = self.config.crawler.concurrency_limit.max(1) as usize;

        stream::iter(urls.iter().cloned())
            .map(|url| async move {
                if cancel.is_cancelled() {
                    return (url, TierFetch::Cancelled);
                }

                let result = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => TierFetch::Cancelled,
                    result = self.fetcher.fetch(&url) => match result {
                        Ok(page) => TierFetch::Page(page),
                        Err(e) => TierFetch::Failed(e),
                    },
                };
                (url, result)
            })
            .buffered(limit)
            .collect()
            .await
    }

    /// Folds one tier fetch into the crawl state, returning its child links
    ///
    /// A failed page is recorded and yields no children, so its subtree is skipped.
    fn visit(&self, state: &mut CrawlState, url: Url, level: Level, fetched: TierFetch) -> Vec<Url> {
        match fetched {
            TierFetch::Page(page) => match self.process_page(state, &url, level, &page) {
                Ok(children) => children,
                Err(e) => {
                    state.record_visit(PageVisit::failed(url, level, e), Vec::new());
                    Vec::new()
                }
            },
            TierFetch::Failed(e) => {
                state.record_visit(PageVisit::failed(url, level, e), Vec::new());
                Vec::new()
            }
            TierFetch::Cancelled => {
                state.record_visit(PageVisit::cancelled(url, level), Vec::new());
                Vec::new()
            }
        }
    }

    /// Extracts records and child links from a fetched page
    ///
    /// Relative links resolve against the post-redirect URL. The parsed document
    /// never outlives this call.
    fn process_page(
        &self,
        state: &mut CrawlState,
        url: &Url,
        level: Level,
        fetched: &FetchedPage,
    ) -> Result<Vec<Url>, ExtractionError> {
        state.retain_markup(level, url, &fetched.body);

        let page = Page::parse(fetched.final_url.clone(), &fetched.body)?;
        let extraction = self.extractor.extract_with_strategy(&page, level);
        let children = discover_child_links(&page, &self.layout, level);

        state.record_visit(
            PageVisit::extracted(
                url.clone(),
                level,
                extraction.records.len(),
                extraction.strategy,
                children.len(),
            ),
            extraction.records,
        );

        Ok(children)
    }
}
