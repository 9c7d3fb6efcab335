//! URL handling module
//!
//! This module provides URL canonicalization, link resolution and the
//! classification of links against the site's index/state/city structure.

mod layout;
mod normalize;

pub use layout::{slug_to_name, LinkKind, SiteLayout};
pub use normalize::{canonical_key, canonical_url, canonicalize, resolve_link};
