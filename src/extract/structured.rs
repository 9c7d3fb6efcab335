//! JSON-LD (`<script type="application/ld+json">`) extraction

use crate::extract::{Page, PageExtractor};
use crate::record::{Level, Record};
use crate::url::{resolve_link, SiteLayout};
use scraper::Selector;
use serde_json::Value;

/// schema.org types treated as a single listing
const LISTING_TYPES: &[&str] = &[
    "Organization",
    "LocalBusiness",
    "Corporation",
    "Place",
    "DataCenter",
    "ProfessionalService",
];

/// Extracts listings from a page's embedded JSON-LD
///
/// `ItemList` blocks contribute one record per `itemListElement`; organization-type
/// blocks contribute one record each. Blocks that fail to parse, and entries
/// without a usable name, are skipped without affecting their siblings.
#[derive(Debug, Clone)]
pub struct StructuredDataExtractor {
    layout: SiteLayout,
}

impl StructuredDataExtractor {
    pub fn new(layout: SiteLayout) -> Self {
        Self { layout }
    }
}

impl PageExtractor for StructuredDataExtractor {
    fn extract(&self, page: &Page, level: Level) -> Vec<Record> {
        let (default_state, default_city) = self.layout.location_of(page.url());
        let mut records = Vec::new();

        for item in json_ld_blocks(page) {
            if has_type(&item, &["ItemList"]) {
                let elements = item
                    .get("itemListElement")
                    .and_then(Value::as_array)
                    .map(Vec::as_slice)
                    .unwrap_or_default();
                records.extend(
                    elements
                        .iter()
                        .filter_map(|element| list_element_to_record(element, page, level)),
                );
            } else if has_type(&item, LISTING_TYPES) {
                records.extend(entity_to_record(&item, None, page, level));
            }
        }

        records
            .into_iter()
            .map(|r| r.with_location_defaults(default_state.as_deref(), default_city.as_deref()))
            .collect()
    }
}

/// Parses every JSON-LD block on the page into a flat list of objects
///
/// A block may hold an object, an array of objects, or an `@graph` container;
/// graph members are appended after their container. Unparseable blocks are
/// logged at debug level and skipped.
pub fn json_ld_blocks(page: &Page) -> Vec<Value> {
    let mut items = Vec::new();

    let Ok(script_selector) = Selector::parse("script[type]") else {
        return items;
    };

    for script in page.document().select(&script_selector) {
        let is_json_ld = script
            .value()
            .attr("type")
            .map(|t| t.trim().eq_ignore_ascii_case("application/ld+json"))
            .unwrap_or(false);
        if !is_json_ld {
            continue;
        }

        let text: String = script.text().collect();
        let payload: Value = match serde_json::from_str(text.trim()) {
            Ok(mut value) => {
                decode_entities(&mut value);
                value
            }
            Err(e) => {
                tracing::debug!("Skipping malformed JSON-LD block on {}: {}", page.url(), e);
                continue;
            }
        };

        let objects = match payload {
            Value::Array(entries) => entries.into_iter().filter(Value::is_object).collect(),
            value @ Value::Object(_) => vec![value],
            _ => Vec::new(),
        };

        for object in objects {
            let graph: Vec<Value> = object
                .get("@graph")
                .and_then(Value::as_array)
                .map(|g| g.iter().filter(|v| v.is_object()).cloned().collect())
                .unwrap_or_default();
            items.push(object);
            items.extend(graph);
        }
    }

    items
}

/// Decodes HTML character references in every string of a JSON-LD value
///
/// Sites often entity-escape text inside script blocks (`AT&amp;T`), which
/// would otherwise reach names and identity keys verbatim.
fn decode_entities(value: &mut Value) {
    match value {
        Value::String(s) => {
            if s.contains('&') {
                *s = html_escape::decode_html_entities(s.as_str()).into_owned();
            }
        }
        Value::Array(entries) => entries.iter_mut().for_each(decode_entities),
        Value::Object(map) => map.values_mut().for_each(decode_entities),
        _ => {}
    }
}

/// Returns true if `@type` (a string or an array of strings) names one of `types`
fn has_type(item: &Value, types: &[&str]) -> bool {
    let matches = |s: &str| types.iter().any(|t| s.eq_ignore_ascii_case(t));

    match item.get("@type") {
        Some(Value::String(s)) => matches(s),
        Some(Value::Array(entries)) => entries.iter().filter_map(Value::as_str).any(matches),
        _ => false,
    }
}

/// Converts one `itemListElement` entry
///
/// The listed entity is the `item` object when there is one; otherwise the
/// element itself, with a string `item` taken as its URL.
fn list_element_to_record(element: &Value, page: &Page, level: Level) -> Option<Record> {
    match element.get("item") {
        Some(entity @ Value::Object(_)) => entity_to_record(entity, None, page, level),
        Some(Value::String(url)) => entity_to_record(element, Some(url), page, level),
        _ => entity_to_record(element, None, page, level),
    }
}

fn entity_to_record(
    entity: &Value,
    fallback_url: Option<&str>,
    page: &Page,
    level: Level,
) -> Option<Record> {
    let name = entity.get("name")?.as_str()?;

    let source_url = entity
        .get("url")
        .and_then(Value::as_str)
        .or(fallback_url)
        .and_then(|href| resolve_link(href, page.url()))
        .unwrap_or_else(|| page.url().clone());

    let record = Record::new(name, source_url.as_str(), level)?;

    Some(match entity.get("address") {
        Some(Value::Object(address)) => {
            let field = |key: &str| address.get(key).and_then(Value::as_str).map(str::to_string);
            record
                .with_address(field("streetAddress"))
                .with_city(field("addressLocality"))
                .with_state(field("addressRegion"))
                .with_postal_code(field("postalCode"))
        }
        Some(Value::String(address)) => record.with_address(Some(address.clone())),
        _ => record,
    })
}
