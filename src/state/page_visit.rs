//! Per-page visit records
//!
//! A `PageVisit` exists only between fetching a page and folding it into the
//! crawl state.

use crate::extract::Strategy;
use crate::record::Level;
use crate::{ExtractionError, FetchError};
use thiserror::Error;
use url::Url;

/// Why a page contributed nothing
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PageFailure {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),
}

/// What happened to a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VisitOutcome {
    /// Fetched and extracted
    Extracted {
        records: usize,
        strategy: Strategy,
        child_links: usize,
    },

    /// Skipped, together with its subtree
    Failed(PageFailure),

    /// Never fetched because the crawl was cancelled
    Cancelled,
}

/// One page of the crawl and its outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageVisit {
    pub url: Url,
    pub level: Level,
    pub outcome: VisitOutcome,
}

impl PageVisit {
    pub fn extracted(
        url: Url,
        level: Level,
        records: usize,
        strategy: Strategy,
        child_links: usize,
    ) -> Self {
        Self {
            url,
            level,
            outcome: VisitOutcome::Extracted {
                records,
                strategy,
                child_links,
            },
        }
    }

    pub fn failed(url: Url, level: Level, failure: impl Into<PageFailure>) -> Self {
        Self {
            url,
            level,
            outcome: VisitOutcome::Failed(failure.into()),
        }
    }

    pub fn cancelled(url: Url, level: Level) -> Self {
        Self {
            url,
            level,
            outcome: VisitOutcome::Cancelled,
        }
    }

    /// Returns true if the page was fetched and extracted
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, VisitOutcome::Extracted { .. })
    }

    /// Returns true if the page was skipped because of an error
    pub fn is_error(&self) -> bool {
        matches!(self.outcome, VisitOutcome::Failed(_))
    }
}
