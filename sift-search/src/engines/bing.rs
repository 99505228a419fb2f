//! Bing connector.
//!
//! Bing sometimes wraps result links in `bing.com/ck/a` click-tracking
//! redirects whose `u` parameter carries the target as `a1` + base64url;
//! those are unwrapped before the result is reported.

use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine as _;
use scraper::Html;
use url::Url;

use super::{element_text, selector};
use crate::config::SearchConfig;
use crate::engine::{Capabilities, Connector};
use crate::error::SearchError;
use crate::http;
use crate::types::{EngineResponse, RawResult, RequestOptions};

/// Registered name.
pub const NAME: &str = "bing";

/// Factory used by the built-in registration list.
pub fn connector(config: &SearchConfig) -> Arc<dyn Connector> {
    Arc::new(BingConnector::new(config.clone()))
}

/// Bing HTML search scraper. Search only; weighted below the others since
/// its index overlaps heavily with theirs.
pub struct BingConnector {
    config: SearchConfig,
}

impl BingConnector {
    /// Create a connector using `config` for timeouts and safe search.
    pub fn new(config: SearchConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Connector for BingConnector {
    fn capabilities(&self) -> Capabilities {
        Capabilities::SEARCH
    }

    fn weight(&self) -> f64 {
        0.8
    }

    async fn search(
        &self,
        query: &str,
        _options: RequestOptions,
    ) -> Result<EngineResponse, SearchError> {
        tracing::trace!(query, "Bing search");

        let client = http::build_client(&self.config)?;
        let safe_search = if self.config.safe_search { "Strict" } else { "Off" };

        let request = client
            .get("https://www.bing.com/search")
            .query(&[("q", query), ("setlang", "en"), ("safeSearch", safe_search)])
            .header("Accept", "text/html,application/xhtml+xml")
            .header("Accept-Language", "en-US,en;q=0.9");
        let html = http::fetch_text("Bing", request).await?;

        parse_bing_html(&html, self.config.max_results)
    }
}

/// Resolve a `bing.com/ck/a?...&u=a1<base64url>` link to its target.
/// Other links are returned unchanged; undecodable redirects yield `None`.
fn resolve_link(href: &str) -> Option<String> {
    let Ok(parsed) = Url::parse(href) else {
        return Some(href.to_string());
    };
    let is_redirect = parsed
        .host_str()
        .is_some_and(|host| host.ends_with("bing.com"))
        && parsed.path().starts_with("/ck/a");
    if !is_redirect {
        return Some(href.to_string());
    }

    let encoded = parsed
        .query_pairs()
        .find(|(key, _)| key == "u")
        .map(|(_, value)| value.into_owned())?;
    let payload = encoded.strip_prefix("a1")?.trim_end_matches('=');
    let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(payload)
        .ok()?;
    String::from_utf8(bytes).ok()
}

/// Parse a Bing results page.
pub(crate) fn parse_bing_html(
    html: &str,
    max_results: usize,
) -> Result<EngineResponse, SearchError> {
    let document = Html::parse_document(html);

    let result_sel = selector("li.b_algo")?;
    let link_sel = selector("h2 a")?;
    let snippet_sel = selector(".b_caption p, .b_lineclamp2")?;
    let requery_sel = selector("#sp_requery a, #sp_recourse a")?;

    let mut results = Vec::new();

    for element in document.select(&result_sel) {
        let Some(link) = element.select(&link_sel).next() else {
            continue;
        };
        let title = element_text(link);
        if title.is_empty() {
            continue;
        }
        let Some(url) = link
            .value()
            .attr("href")
            .filter(|h| !h.is_empty())
            .and_then(resolve_link)
        else {
            continue;
        };
        let content = element
            .select(&snippet_sel)
            .next()
            .map(element_text)
            .unwrap_or_default();

        results.push(RawResult::new(url, title, content, results.len() + 1));
        if results.len() >= max_results {
            break;
        }
    }

    // "Including results for <x>" / "Do you want results only for <y>?"
    let suggestion = document
        .select(&requery_sel)
        .next()
        .map(element_text)
        .filter(|s| !s.is_empty());

    tracing::debug!(count = results.len(), "Bing results parsed");
    Ok(EngineResponse {
        results,
        suggestion,
        ..Default::default()
    })
}
