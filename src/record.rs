//! Data center records and their identity
//!
//! A [`Record`] is one listing extracted from one page. Two records are the same
//! listing when their [`IdentityKey`]s are equal: the name compared
//! case-insensitively and the source URL compared in canonical form.

use crate::url::canonical_key;
use serde::Serialize;
use std::fmt;

/// Traversal tier a page belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// The country index page
    Index,
    /// A state page linked from the index
    State,
    /// A city page linked from a state page
    City,
}

impl Level {
    /// All levels, in traversal order
    pub const ALL: [Level; 3] = [Level::Index, Level::State, Level::City];

    /// The tier directly below this one, if any
    pub fn child(self) -> Option<Level> {
        match self {
            Self::Index => Some(Self::State),
            Self::State => Some(Self::City),
            Self::City => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Index => "index",
            Self::State => "state",
            Self::City => "city",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// A single data center listing
///
/// Field order is the CSV column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    pub name: String,
    pub source_url: String,
    pub level: Level,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
}

impl Record {
    /// Creates a record, or None when the name is empty after trimming
    ///
    /// Whitespace runs in the name collapse to a single space.
    pub fn new(name: &str, source_url: impl Into<String>, level: Level) -> Option<Self> {
        let name = normalize_whitespace(name);
        if name.is_empty() {
            return None;
        }

        Some(Self {
            name,
            source_url: source_url.into(),
            level,
            address: None,
            city: None,
            state: None,
            postal_code: None,
        })
    }

    pub fn with_address(mut self, address: Option<String>) -> Self {
        self.address = non_empty(address);
        self
    }

    pub fn with_city(mut self, city: Option<String>) -> Self {
        self.city = non_empty(city);
        self
    }

    pub fn with_state(mut self, state: Option<String>) -> Self {
        self.state = non_empty(state);
        self
    }

    pub fn with_postal_code(mut self, postal_code: Option<String>) -> Self {
        self.postal_code = non_empty(postal_code);
        self
    }

    /// Fills state and city from page-derived defaults where missing
    pub fn with_location_defaults(mut self, state: Option<&str>, city: Option<&str>) -> Self {
        if self.state.is_none() {
            self.state = non_empty(state.map(str::to_string));
        }
        if self.city.is_none() {
            self.city = non_empty(city.map(str::to_string));
        }
        self
    }

    /// Deduplication key of this record
    pub fn identity_key(&self) -> IdentityKey {
        IdentityKey {
            name: self.name.to_lowercase(),
            url: canonical_key(&self.source_url),
        }
    }
}

/// Normalized (name, source URL) pair
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdentityKey {
    name: String,
    url: String,
}

/// Collapses whitespace runs to single spaces and trims the ends
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| normalize_whitespace(&v))
        .filter(|v| !v.is_empty())
}
