//! Child-page discovery
//!
//! Navigation is independent of record extraction: a page can list no data
//! centers and still link to every state. Candidate URLs come from JSON-LD
//! (`url`, `item` and `@id` strings at any depth) and from anchors, in that order.

use crate::extract::{json_ld_blocks, Page};
use crate::record::Level;
use crate::url::{canonical_key, resolve_link, LinkKind, SiteLayout};
use scraper::Selector;
use serde_json::Value;
use std::collections::HashSet;
use url::Url;

/// JSON-LD keys whose string values are treated as links
const LINK_KEYS: &[&str] = &["url", "item", "@id"];

/// Returns the pages of the next tier linked from `page`, in discovery order
///
/// Index pages yield state pages and state pages yield city pages; city pages
/// are leaves and always yield nothing. URLs are deduplicated by canonical form.
pub fn discover_child_links(page: &Page, layout: &SiteLayout, level: Level) -> Vec<Url> {
    let target = match level {
        Level::Index => LinkKind::State,
        Level::State => LinkKind::City,
        Level::City => return Vec::new(),
    };

    let mut candidates: Vec<String> = Vec::new();
    for block in json_ld_blocks(page) {
        collect_json_links(&block, &mut candidates);
    }

    if let Ok(a_selector) = Selector::parse("a[href]") {
        candidates.extend(
            page.document()
                .select(&a_selector)
                .filter_map(|a| a.value().attr("href"))
                .map(str::to_string),
        );
    }

    let mut seen = HashSet::new();
    candidates
        .iter()
        .filter_map(|href| resolve_link(href, page.url()))
        .filter(|url| layout.classify(url) == Some(target))
        .filter(|url| seen.insert(canonical_key(url.as_str())))
        .collect()
}

fn collect_json_links(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                match child {
                    Value::String(s) if LINK_KEYS.contains(&key.as_str()) => out.push(s.clone()),
                    _ => collect_json_links(child, out),
                }
            }
        }
        Value::Array(entries) => {
            for entry in entries {
                collect_json_links(entry, out);
            }
        }
        _ => {}
    }
}
