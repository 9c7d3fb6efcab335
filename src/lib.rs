//! dcmap-crawler: a three-tier directory crawler for data center listings
//!
//! This crate walks a listing site's country index page, its state pages and their
//! city pages, extracts data center records from each page (JSON-LD first, anchor
//! heuristics as a fallback), deduplicates them and writes the result as CSV.

pub mod config;
pub mod crawler;
pub mod extract;
pub mod output;
pub mod record;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for crawl operations
///
/// Only the variants surfaced from [`crawler::run_crawl`] are fatal; per-page
/// failures are reported as [`FetchError`] / [`ExtractionError`] and skipped.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Index page {url} unavailable: {reason}")]
    IndexUnavailable { url: String, reason: String },

    #[error("Crawl cancelled before the index page was fetched")]
    Cancelled,

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure to retrieve a single page
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("{url} unreachable: {message}")]
    Unreachable { url: String, message: String },

    #[error("Access denied for {url} (HTTP {status})")]
    Denied { url: String, status: u16 },

    #[error("HTTP {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Malformed response from {url}: {message}")]
    MalformedResponse { url: String, message: String },
}

impl FetchError {
    /// Returns true if another attempt at the same URL might succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Unreachable { .. } | Self::Timeout { .. } => true,
            Self::HttpStatus { status, .. } => *status >= 500,
            Self::Denied { .. } | Self::MalformedResponse { .. } => false,
        }
    }

    /// The URL the failed request was made for
    pub fn url(&self) -> &str {
        match self {
            Self::Unreachable { url, .. }
            | Self::Denied { url, .. }
            | Self::HttpStatus { url, .. }
            | Self::Timeout { url }
            | Self::MalformedResponse { url, .. } => url,
        }
    }
}

/// Markup that cannot be extracted from at all
///
/// Absence of records is never an error; this only covers documents that give
/// the extractors nothing to look at.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("Empty document at {url}")]
    EmptyDocument { url: String },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for crawl operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{run_crawl, Coordinator, CrawlOutcome};
pub use record::{Level, Record};
pub use url::{canonical_url, SiteLayout};
