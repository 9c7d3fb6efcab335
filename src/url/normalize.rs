use crate::UrlError;
use url::Url;

/// Computes the canonical form of a URL string
///
/// # Canonicalization Steps
///
/// 1. Parse the URL; reject if malformed
/// 2. Reject anything that is not HTTP or HTTPS, or that has no host
/// 3. Lowercase the host (done by the parser for http/https)
/// 4. Normalize path:
///    - Collapse repeated slashes
///    - Remove dot segments (. and ..)
///    - Remove trailing slash (except for root /)
///    - Empty path becomes /
/// 5. Remove query and fragment
///
/// Two URLs name the same page exactly when their canonical forms are equal.
///
/// # Examples
///
/// ```
/// use dcmap_crawler::url::canonical_url;
///
/// let url = canonical_url("https://WWW.Example.com/usa/texas/?page=2#top").unwrap();
/// assert_eq!(url.as_str(), "https://www.example.com/usa/texas");
/// ```
pub fn canonical_url(url_str: &str) -> Result<Url, UrlError> {
    let url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;
    canonicalize(&url)
}

/// Canonicalizes an already parsed URL
pub fn canonicalize(url: &Url) -> Result<Url, UrlError> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingHost);
    }

    let mut canonical = url.clone();
    let normalized_path = normalize_path(url.path());
    canonical.set_path(&normalized_path);
    canonical.set_query(None);
    canonical.set_fragment(None);

    Ok(canonical)
}

/// Canonical string used as a comparison key
///
/// Falls back to the trimmed, lowercased input when the string is not a valid
/// http(s) URL, so that malformed URLs still compare consistently with themselves.
pub fn canonical_key(url_str: &str) -> String {
    match canonical_url(url_str) {
        Ok(url) => url.to_string(),
        Err(_) => url_str.trim().to_lowercase(),
    }
}

/// Normalizes a URL path by removing dot segments and trailing slashes
fn normalize_path(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => continue,
            ".." => {
                segments.pop();
            }
            _ => segments.push(segment),
        }
    }

    if segments.is_empty() {
        return "/".to_string();
    }

    format!("/{}", segments.join("/"))
}

/// Resolves a link href against the page it was found on
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - fragment-only links (same page anchors)
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
///
/// Query and fragment are dropped from the resolved URL.
pub fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if lowered.starts_with("javascript:")
        || lowered.starts_with("mailto:")
        || lowered.starts_with("tel:")
        || lowered.starts_with("data:")
    {
        return None;
    }

    let mut absolute_url = base_url.join(href).ok()?;
    if absolute_url.scheme() != "http" && absolute_url.scheme() != "https" {
        return None;
    }

    absolute_url.set_query(None);
    absolute_url.set_fragment(None);
    Some(absolute_url)
}
