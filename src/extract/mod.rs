//! Record extraction from fetched pages
//!
//! This module contains:
//! - [`StructuredDataExtractor`]: JSON-LD listings (authoritative when present)
//! - [`HeuristicLinkExtractor`]: anchor scraping against the site's link patterns
//! - [`FallbackExtractor`]: runs the first and only falls back to the second
//!   when the first finds nothing
//! - [`discover_child_links`]: navigation links to the next tier, independent of
//!   whether any records were found
//!
//! Extraction never fails: a page without listings yields an empty vector.

mod discover;
mod fallback;
mod links;
mod structured;

pub use discover::discover_child_links;
pub use fallback::{default_extractor, DefaultExtractor, Extraction, FallbackExtractor, Strategy};
pub use links::HeuristicLinkExtractor;
pub use structured::{json_ld_blocks, StructuredDataExtractor};

use crate::record::{Level, Record};
use crate::ExtractionError;
use scraper::Html;
use url::Url;

/// A fetched page, parsed once and shared by all extractors
pub struct Page {
    url: Url,
    document: Html,
}

impl Page {
    /// Parses page markup
    ///
    /// # Returns
    ///
    /// * `Ok(Page)` - The parsed document
    /// * `Err(ExtractionError::EmptyDocument)` - The markup is empty or whitespace
    pub fn parse(url: Url, markup: &str) -> Result<Self, ExtractionError> {
        if markup.trim().is_empty() {
            return Err(ExtractionError::EmptyDocument {
                url: url.to_string(),
            });
        }

        Ok(Self {
            document: Html::parse_document(markup),
            url,
        })
    }

    /// URL the page was fetched from; relative links resolve against it
    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn document(&self) -> &Html {
        &self.document
    }
}

/// Capability shared by every record extraction strategy
pub trait PageExtractor {
    /// Extracts records from a page of the given tier
    fn extract(&self, page: &Page, level: Level) -> Vec<Record>;
}

impl<T: PageExtractor + ?Sized> PageExtractor for &T {
    fn extract(&self, page: &Page, level: Level) -> Vec<Record> {
        (**self).extract(page, level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rejects_empty_markup() {
        let url = Url::parse("https://example.com/usa/").unwrap();
        let result = Page::parse(url, "  \n ");
        assert!(matches!(
            result,
            Err(ExtractionError::EmptyDocument { .. })
        ));
    }

    #[test]
    fn test_parse_keeps_url() {
        let url = Url::parse("https://example.com/usa/").unwrap();
        let page = Page::parse(url.clone(), "<html></html>").unwrap();
        assert_eq!(page.url(), &url);
    }
}
