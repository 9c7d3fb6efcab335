//! Heuristic anchor extraction
//!
//! Fallback for pages without usable structured data. Anchors are matched
//! against the site's URL patterns for the tier below the current page, so the
//! results degrade quietly if the site changes its markup or URL scheme.

use crate::extract::{Page, PageExtractor};
use crate::record::{normalize_whitespace, Level, Record};
use crate::url::{canonical_key, resolve_link, LinkKind, SiteLayout};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Selector};
use std::collections::HashSet;

/// Class names that mark an address next to a listing link
static ADDRESS_CLASS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)address|location").expect("valid regex"));

/// Navigation chrome that never names a listing
const BOILERPLATE_TEXT: &[&str] = &[
    "more",
    "read more",
    "view all",
    "see all",
    "view more",
    "show more",
    "details",
    "next",
    "previous",
    "prev",
    "back",
    "home",
    "top",
    "click here",
    "»",
    "«",
];

/// Derives records from anchors that point one tier down
///
/// | Page level | Anchors kept |
/// |------------|--------------|
/// | Index | state pages |
/// | State | city pages |
/// | City | data center detail pages |
#[derive(Debug, Clone)]
pub struct HeuristicLinkExtractor {
    layout: SiteLayout,
}

impl HeuristicLinkExtractor {
    pub fn new(layout: SiteLayout) -> Self {
        Self { layout }
    }

    /// Link kind whose anchors become records on a page of `level`
    pub fn target_kind(level: Level) -> LinkKind {
        match level {
            Level::Index => LinkKind::State,
            Level::State => LinkKind::City,
            Level::City => LinkKind::Detail,
        }
    }
}

impl PageExtractor for HeuristicLinkExtractor {
    fn extract(&self, page: &Page, level: Level) -> Vec<Record> {
        let target = Self::target_kind(level);
        let (default_state, default_city) = self.layout.location_of(page.url());
        let mut seen = HashSet::new();
        let mut records = Vec::new();

        let Ok(a_selector) = Selector::parse("a[href]") else {
            return records;
        };

        for element in page.document().select(&a_selector) {
            let Some(url) = element
                .value()
                .attr("href")
                .and_then(|href| resolve_link(href, page.url()))
            else {
                continue;
            };

            if self.layout.classify(&url) != Some(target) {
                continue;
            }

            let name = anchor_text(&element);
            if is_boilerplate(&name) {
                continue;
            }

            // First anchor for a URL wins
            if !seen.insert(canonical_key(url.as_str())) {
                continue;
            }

            if let Some(record) = Record::new(&name, url.as_str(), level) {
                records.push(
                    record
                        .with_address(nearby_address(&element))
                        .with_location_defaults(default_state.as_deref(), default_city.as_deref()),
                );
            }
        }

        records
    }
}

fn anchor_text(element: &ElementRef<'_>) -> String {
    normalize_whitespace(&element.text().collect::<Vec<_>>().join(" "))
}

fn is_boilerplate(text: &str) -> bool {
    text.is_empty()
        || BOILERPLATE_TEXT
            .iter()
            .any(|b| text.eq_ignore_ascii_case(b))
}

/// Address text from the anchor's enclosing list item, article or div
///
/// Looks for a descendant of the nearest such container whose class mentions
/// "address" or "location", skipping the anchor's own ancestors.
fn nearby_address(anchor: &ElementRef<'_>) -> Option<String> {
    let container = anchor
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|e| matches!(e.value().name(), "li" | "article" | "div"))?;

    let class_selector = Selector::parse("[class]").ok()?;

    container
        .select(&class_selector)
        .filter(|candidate| candidate.id() != container.id())
        .filter(|candidate| !anchor.ancestors().any(|a| a.id() == candidate.id()))
        .filter(|candidate| candidate.id() != anchor.id())
        .find(|candidate| {
            candidate
                .value()
                .attr("class")
                .map(|class| ADDRESS_CLASS.is_match(class))
                .unwrap_or(false)
        })
        .map(|candidate| anchor_text(&candidate))
        .filter(|text| !text.is_empty())
}
