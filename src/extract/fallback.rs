use crate::extract::{HeuristicLinkExtractor, Page, PageExtractor, StructuredDataExtractor};
use crate::record::{Level, Record};
use crate::url::SiteLayout;

/// Which extractor produced a page's records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    Structured,
    Heuristic,
}

/// Records from one page plus the strategy that produced them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub records: Vec<Record>,
    pub strategy: Strategy,
}

/// Runs `primary`, and `fallback` only when `primary` finds nothing
///
/// Structured data is authoritative when present, so the fragile heuristic
/// path is never consulted for a page that has it.
#[derive(Debug, Clone)]
pub struct FallbackExtractor<P, F> {
    primary: P,
    fallback: F,
}

/// The production pairing: JSON-LD first, anchor heuristics second
pub type DefaultExtractor = FallbackExtractor<StructuredDataExtractor, HeuristicLinkExtractor>;

/// Builds the production extractor for a site layout
pub fn default_extractor(layout: &SiteLayout) -> DefaultExtractor {
    FallbackExtractor::new(
        StructuredDataExtractor::new(layout.clone()),
        HeuristicLinkExtractor::new(layout.clone()),
    )
}

impl<P: PageExtractor, F: PageExtractor> FallbackExtractor<P, F> {
    pub fn new(primary: P, fallback: F) -> Self {
        Self { primary, fallback }
    }

    /// Extracts records and reports which strategy produced them
    pub fn extract_with_strategy(&self, page: &Page, level: Level) -> Extraction {
        let records = self.primary.extract(page, level);
        if !records.is_empty() {
            return Extraction {
                records,
                strategy: Strategy::Structured,
            };
        }

        tracing::debug!("No structured data on {}, falling back to links", page.url());
        Extraction {
            records: self.fallback.extract(page, level),
            strategy: Strategy::Heuristic,
        }
    }
}

impl<P: PageExtractor, F: PageExtractor> PageExtractor for FallbackExtractor<P, F> {
    fn extract(&self, page: &Page, level: Level) -> Vec<Record> {
        self.extract_with_strategy(page, level).records
    }
}
