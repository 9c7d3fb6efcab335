use crate::url::normalize::canonicalize;
use crate::UrlError;
use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

/// Path fragment used by the site for individual data center pages
static DATA_CENTER_PATH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)/data-?cent(er|re)s?/").expect("valid regex"));

/// Kind of page a link points to, relative to the site's tier structure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkKind {
    /// `<prefix>/<state>`
    State,
    /// `<prefix>/<state>/<city>`
    City,
    /// Anything deeper than a city page, or a data-center path anywhere
    Detail,
}

/// The three-level URL structure of the target site, derived from the root URL
///
/// The root URL's path segments form the country prefix; state and city pages
/// sit one and two segments below it on the same host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteLayout {
    root: Url,
    host: String,
    port: Option<u16>,
    prefix: Vec<String>,
}

impl SiteLayout {
    /// Derives the layout from the crawl's root URL
    ///
    /// # Example
    ///
    /// ```
    /// use dcmap_crawler::url::{LinkKind, SiteLayout};
    /// use url::Url;
    ///
    /// let layout = SiteLayout::from_root(&Url::parse("https://example.com/usa/").unwrap()).unwrap();
    /// let city = Url::parse("https://example.com/usa/texas/dallas/").unwrap();
    /// assert_eq!(layout.classify(&city), Some(LinkKind::City));
    /// ```
    pub fn from_root(root: &Url) -> Result<Self, UrlError> {
        let root = canonicalize(root)?;
        let host = root
            .host_str()
            .ok_or(UrlError::MissingHost)?
            .to_ascii_lowercase();
        let prefix = path_segments(&root)
            .into_iter()
            .map(|s| s.to_ascii_lowercase())
            .collect();

        Ok(Self {
            port: root.port_or_known_default(),
            root,
            host,
            prefix,
        })
    }

    /// Canonical root URL
    pub fn root(&self) -> &Url {
        &self.root
    }

    /// Lowercased path segments of the root URL
    pub fn prefix(&self) -> &[String] {
        &self.prefix
    }

    /// Classifies a URL against the tier structure
    ///
    /// Returns None for off-site URLs, the root itself, and anything outside the
    /// country prefix that is not a data center path.
    pub fn classify(&self, url: &Url) -> Option<LinkKind> {
        if DATA_CENTER_PATH.is_match(url.path()) {
            return Some(LinkKind::Detail);
        }

        let rest = self.relative_segments(url)?;
        match rest.len() {
            0 => None,
            1 => Some(LinkKind::State),
            2 => Some(LinkKind::City),
            _ => Some(LinkKind::Detail),
        }
    }

    /// State and city display names derived from a page URL's slugs
    ///
    /// `https://example.com/usa/new-york/albany/` yields
    /// `(Some("New York"), Some("Albany"))`.
    pub fn location_of(&self, url: &Url) -> (Option<String>, Option<String>) {
        match self.relative_segments(url) {
            Some(rest) => (
                rest.first().map(|s| slug_to_name(s)),
                rest.get(1).map(|s| slug_to_name(s)),
            ),
            None => (None, None),
        }
    }

    /// Path segments below the country prefix, if the URL is on-site and under it
    fn relative_segments(&self, url: &Url) -> Option<Vec<String>> {
        if !self.is_same_site(url) {
            return None;
        }

        let segments = path_segments(url);
        if segments.len() < self.prefix.len() {
            return None;
        }

        let (head, rest) = segments.split_at(self.prefix.len());
        let under_prefix = head
            .iter()
            .zip(&self.prefix)
            .all(|(segment, expected)| segment.eq_ignore_ascii_case(expected));

        under_prefix.then(|| rest.to_vec())
    }

    fn is_same_site(&self, url: &Url) -> bool {
        let same_host = url
            .host_str()
            .map(|h| h.eq_ignore_ascii_case(&self.host))
            .unwrap_or(false);
        same_host && url.port_or_known_default() == self.port
    }
}

fn path_segments(url: &Url) -> Vec<String> {
    url.path_segments()
        .map(|segments| {
            segments
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Turns a URL slug into a display name: `new-york` becomes `New York`
pub fn slug_to_name(slug: &str) -> String {
    slug.replace(['-', '_'], " ")
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> SiteLayout {
        SiteLayout::from_root(&Url::parse("https://example.com/usa/").unwrap()).unwrap()
    }

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_prefix_from_root() {
        assert_eq!(layout().prefix(), ["usa".to_string()]);
        assert_eq!(layout().root().as_str(), "https://example.com/usa");
    }

    #[test]
    fn test_classify_tiers() {
        let layout = layout();
        assert_eq!(
            layout.classify(&url("https://example.com/usa/texas/")),
            Some(LinkKind::State)
        );
        assert_eq!(
            layout.classify(&url("https://example.com/usa/texas/dallas")),
            Some(LinkKind::City)
        );
        assert_eq!(
            layout.classify(&url("https://example.com/usa/texas/dallas/infomart/")),
            Some(LinkKind::Detail)
        );
    }

    #[test]
    fn test_classify_rejects_root_and_other_sections() {
        let layout = layout();
        assert_eq!(layout.classify(&url("https://example.com/usa/")), None);
        assert_eq!(layout.classify(&url("https://example.com/canada/ontario/")), None);
        assert_eq!(layout.classify(&url("https://example.com/")), None);
    }

    #[test]
    fn test_classify_rejects_other_hosts() {
        let layout = layout();
        assert_eq!(layout.classify(&url("https://other.com/usa/texas/")), None);
        assert_eq!(
            layout.classify(&url("https://example.com:8443/usa/texas/")),
            None
        );
    }

    #[test]
    fn test_prefix_comparison_ignores_case() {
        assert_eq!(
            layout().classify(&url("https://EXAMPLE.com/USA/texas/")),
            Some(LinkKind::State)
        );
    }

    #[test]
    fn test_data_center_path_is_detail() {
        let layout = layout();
        assert_eq!(
            layout.classify(&url("https://example.com/data-centers/equinix-da1/")),
            Some(LinkKind::Detail)
        );
        assert_eq!(
            layout.classify(&url("https://other.com/datacentre/abc")),
            Some(LinkKind::Detail)
        );
    }

    #[test]
    fn test_root_without_prefix() {
        let layout = SiteLayout::from_root(&url("http://127.0.0.1:8080/")).unwrap();
        assert!(layout.prefix().is_empty());
        assert_eq!(
            layout.classify(&url("http://127.0.0.1:8080/ohio")),
            Some(LinkKind::State)
        );
    }

    #[test]
    fn test_location_of() {
        let layout = layout();
        assert_eq!(
            layout.location_of(&url("https://example.com/usa/new-york/albany/")),
            (Some("New York".to_string()), Some("Albany".to_string()))
        );
        assert_eq!(
            layout.location_of(&url("https://example.com/usa/")),
            (None, None)
        );
        assert_eq!(
            layout.location_of(&url("https://other.com/usa/ohio/")),
            (None, None)
        );
    }

    #[test]
    fn test_slug_to_name() {
        assert_eq!(slug_to_name("new-york"), "New York");
        assert_eq!(slug_to_name("SALT-LAKE-city"), "Salt Lake City");
        assert_eq!(slug_to_name("-"), "");
    }
}
