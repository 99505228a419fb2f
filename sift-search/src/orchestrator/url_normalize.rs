//! URL normalisation for cross-engine deduplication.
//!
//! Canonicalises URLs so that equivalent pages (differing only in
//! query-parameter order, tracking parameters, fragments, default ports or
//! host capitalisation) collapse onto one key.

use url::Url;

use crate::error::SearchError;

/// Tracking query parameters that are stripped during normalisation.
const TRACKING_PARAMS: &[&str] = &[
    "utm_source",
    "utm_medium",
    "utm_campaign",
    "utm_term",
    "utm_content",
    "fbclid",
    "gclid",
    "msclkid",
    "ref",
    "si",
];

/// Normalise a result URL into its deduplication key.
///
/// 1. Lowercase scheme and host (path is preserved as-is).
/// 2. Remove default ports (`:80` for HTTP, `:443` for HTTPS).
/// 3. Remove a trailing slash from the path (unless the path is `"/"`).
/// 4. Strip known tracking parameters and sort the rest by key.
/// 5. Remove the fragment.
///
/// # Errors
///
/// Returns [`SearchError::UrlNormalization`] for empty input, unparseable
/// or relative URLs, and schemes other than `http`/`https`.
///
/// # Examples
///
/// ```
/// use sift_search::orchestrator::url_normalize::normalize_url;
///
/// let a = normalize_url("https://Example.COM/path/?b=2&a=1#section").unwrap();
/// let b = normalize_url("https://example.com/path?a=1&b=2").unwrap();
/// assert_eq!(a, b);
/// ```
pub fn normalize_url(raw: &str) -> Result<String, SearchError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(invalid(raw, "missing URL"));
    }

    let mut parsed = Url::parse(trimmed).map_err(|e| invalid(raw, &e.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid(
            raw,
            &format!("unsupported scheme {}", parsed.scheme()),
        ));
    }

    parsed.set_fragment(None);

    if is_default_port(&parsed) {
        // Only fails for cannot-be-a-base URLs, which http(s) never are.
        let _ = parsed.set_port(None);
    }

    let mut params: Vec<(String, String)> = parsed
        .query_pairs()
        .filter(|(key, _)| !TRACKING_PARAMS.contains(&key.to_lowercase().as_str()))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    params.sort();

    if params.is_empty() {
        parsed.set_query(None);
    } else {
        parsed.query_pairs_mut().clear().extend_pairs(&params);
    }

    let path = parsed.path().to_string();
    if path.len() > 1 && path.ends_with('/') {
        parsed.set_path(&path[..path.len() - 1]);
    }

    Ok(parsed.to_string())
}

fn invalid(url: &str, reason: &str) -> SearchError {
    SearchError::UrlNormalization {
        url: url.to_string(),
        reason: reason.to_string(),
    }
}

/// Returns `true` if the URL uses the default port for its scheme.
fn is_default_port(url: &Url) -> bool {
    matches!(
        (url.scheme(), url.port()),
        ("http", Some(80)) | ("https", Some(443))
    )
}
