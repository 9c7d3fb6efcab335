//! State module for tracking crawl progress
//!
//! This module provides the process-scoped state of one crawl run.
//!
//! # Components
//!
//! - `CrawlState`: visited URLs, discovered state/city pages, the running record aggregate
//! - `PageVisit`: what happened to one page, consumed as soon as it is recorded

mod crawl_state;
mod page_visit;

// Re-export main types
pub use crawl_state::CrawlState;
pub use page_visit::{PageFailure, PageVisit, VisitOutcome};
