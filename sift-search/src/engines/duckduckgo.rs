//! DuckDuckGo connector.
//!
//! Search scrapes the script-free page at `https://html.duckduckgo.com/html/`;
//! autocomplete uses the `/ac/` endpoint in OpenSearch list format.

use std::sync::Arc;

use async_trait::async_trait;
use scraper::Html;
use url::Url;

use super::{element_text, parse_suggestion_list, selector};
use crate::config::SearchConfig;
use crate::engine::{Capabilities, Connector};
use crate::error::SearchError;
use crate::http;
use crate::types::{EngineResponse, RawResult, RequestOptions};

/// Registered name.
pub const NAME: &str = "duckduckgo";

/// Factory used by the built-in registration list.
pub fn connector(config: &SearchConfig) -> Arc<dyn Connector> {
    Arc::new(DuckDuckGoConnector::new(config.clone()))
}

/// DuckDuckGo HTML search scraper.
pub struct DuckDuckGoConnector {
    config: SearchConfig,
}

impl DuckDuckGoConnector {
    /// Create a connector using `config` for timeouts and safe search.
    pub fn new(config: SearchConfig) -> Self {
        Self { config }
    }

    /// Extract the actual URL from DuckDuckGo's redirect wrapper.
    ///
    /// DDG wraps URLs like: `//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com&rut=...`
    /// We parse out the `uddg` query parameter and URL-decode it.
    fn extract_url(href: &str) -> Option<String> {
        let full_href = if href.starts_with("//") {
            format!("https:{href}")
        } else {
            href.to_string()
        };

        let parsed = Url::parse(&full_href).ok()?;

        if parsed.host_str() == Some("duckduckgo.com") && parsed.path().starts_with("/l/") {
            parsed
                .query_pairs()
                .find(|(key, _)| key == "uddg")
                .map(|(_, value)| value.into_owned())
        } else {
            Some(full_href)
        }
    }
}

#[async_trait]
impl Connector for DuckDuckGoConnector {
    fn capabilities(&self) -> Capabilities {
        Capabilities::ALL
    }

    fn weight(&self) -> f64 {
        1.0
    }

    async fn search(
        &self,
        query: &str,
        _options: RequestOptions,
    ) -> Result<EngineResponse, SearchError> {
        tracing::trace!(query, "DuckDuckGo search");

        let client = http::build_client(&self.config)?;

        let mut params = vec![("q", query)];
        if self.config.safe_search {
            params.push(("kp", "1"));
        }

        let request = client
            .post("https://html.duckduckgo.com/html/")
            .form(&params)
            .header("Accept-Language", "en-US,en;q=0.9");
        let html = http::fetch_text("DuckDuckGo", request).await?;

        parse_duckduckgo_html(&html, self.config.max_results)
    }

    async fn autocomplete(&self, partial_query: &str) -> Result<Vec<String>, SearchError> {
        if partial_query.trim().is_empty() {
            return Ok(Vec::new());
        }
        tracing::trace!(partial_query, "DuckDuckGo autocomplete");

        let client = http::build_client(&self.config)?;
        let request = client
            .get("https://duckduckgo.com/ac/")
            .query(&[("q", partial_query), ("type", "list")]);
        let body = http::fetch_text("DuckDuckGo", request).await?;

        parse_suggestion_list(&body)
    }
}

/// Parse DuckDuckGo HTML response into ranked results.
///
/// Extracted as a separate function for testability with mock HTML.
pub(crate) fn parse_duckduckgo_html(
    html: &str,
    max_results: usize,
) -> Result<EngineResponse, SearchError> {
    let document = Html::parse_document(html);

    let result_sel = selector(
        ".result.results_links.results_links_deep:not(.result--ad), .web-result:not(.result--ad)",
    )?;
    let title_sel = selector(".result__a")?;
    let snippet_sel = selector(".result__snippet")?;
    let spelling_sel = selector("#did_you_mean a")?;

    let mut results = Vec::new();

    for element in document.select(&result_sel) {
        let Some(title_el) = element.select(&title_sel).next() else {
            continue;
        };

        let title = element_text(title_el);
        if title.is_empty() {
            continue;
        }

        let Some(url) = title_el.value().attr("href").and_then(DuckDuckGoConnector::extract_url)
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

    let suggestion = document
        .select(&spelling_sel)
        .next()
        .map(element_text)
        .filter(|s| !s.is_empty());

    tracing::debug!(count = results.len(), "DuckDuckGo results parsed");
    Ok(EngineResponse {
        results,
        suggestion,
        ..Default::default()
    })
}
