//! Google connector.
//!
//! Search scrapes the regular results page (`nfpr=1` disables automatic
//! spelling rewrites so the "did you mean" link stays a suggestion). A
//! featured snippet, when present, becomes the answer. Autocomplete uses
//! the Firefox flavour of the suggest endpoint, which returns plain
//! OpenSearch JSON.

use std::sync::Arc;

use async_trait::async_trait;
use scraper::{ElementRef, Html};
use url::Url;

use super::{element_text, parse_suggestion_list, selector};
use crate::config::SearchConfig;
use crate::engine::{Capabilities, Connector};
use crate::error::SearchError;
use crate::http;
use crate::types::{Answer, EngineResponse, RawResult, RequestOptions};

/// Registered name.
pub const NAME: &str = "google";

const SEARCH_URL: &str = "https://www.google.com/search";
const SUGGEST_URL: &str = "https://suggestqueries.google.com/complete/search";

/// Factory used by the built-in registration list.
pub fn connector(config: &SearchConfig) -> Arc<dyn Connector> {
    Arc::new(GoogleConnector::new(config.clone()))
}

/// Google HTML search scraper with suggest-API autocomplete.
pub struct GoogleConnector {
    config: SearchConfig,
}

impl GoogleConnector {
    /// Create a connector using `config` for timeouts and safe search.
    pub fn new(config: SearchConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Connector for GoogleConnector {
    fn capabilities(&self) -> Capabilities {
        Capabilities::ALL
    }

    fn weight(&self) -> f64 {
        1.05
    }

    async fn search(
        &self,
        query: &str,
        _options: RequestOptions,
    ) -> Result<EngineResponse, SearchError> {
        tracing::trace!(query, "Google search");

        let client = http::build_client(&self.config)?;
        let mut params = vec![("nfpr", "1"), ("q", query), ("hl", "en")];
        if self.config.safe_search {
            params.push(("safe", "active"));
        }

        let request = client
            .get(SEARCH_URL)
            .query(&params)
            .header("Accept", "text/html,application/xhtml+xml")
            .header("Accept-Language", "en-US,en;q=0.9");
        let html = http::fetch_text("Google", request).await?;

        parse_google_html(&html, self.config.max_results)
    }

    async fn autocomplete(&self, partial_query: &str) -> Result<Vec<String>, SearchError> {
        if partial_query.trim().is_empty() {
            return Ok(Vec::new());
        }
        tracing::trace!(partial_query, "Google autocomplete");

        let client = http::build_client(&self.config)?;
        let request = client.get(SUGGEST_URL).query(&[
            ("output", "firefox"),
            ("client", "firefox"),
            ("hl", "US-en"),
            ("q", partial_query),
        ]);
        let body = http::fetch_text("Google", request).await?;

        parse_suggestion_list(&body)
    }
}

/// Turn a result link into an absolute target URL, unwrapping
/// `/url?q=<target>` redirects.
fn resolve_href(href: &str) -> Option<String> {
    let base = Url::parse(SEARCH_URL).ok()?;
    let parsed = base.join(href).ok()?;
    if parsed.host_str() == Some("www.google.com") && parsed.path() == "/url" {
        return parsed
            .query_pairs()
            .find(|(key, _)| key == "q" || key == "url")
            .map(|(_, value)| value.into_owned());
    }
    Some(parsed.into())
}

fn first_text(scope: ElementRef<'_>, sel: &scraper::Selector) -> String {
    scope.select(sel).next().map(element_text).unwrap_or_default()
}

/// Parse a Google results page.
pub(crate) fn parse_google_html(
    html: &str,
    max_results: usize,
) -> Result<EngineResponse, SearchError> {
    let document = Html::parse_document(html);

    let item_sel = selector("div.g")?;
    let title_sel = selector("h3")?;
    let link_sel = selector("div.yuRUbf > a[href], h3.H1u2de > a[href]")?;
    let content_sel = selector("div.IsZvec")?;
    let snippet_sel = selector(".c2xzTb")?;
    let snippet_content_sel = selector(".hgKElcm, .X5LH0c, .LGOjhe, .iKJnec")?;
    let snippet_link_sel = selector("a[href]")?;
    let suggestion_sel = selector("a.gL9Hy")?;

    let mut results = Vec::new();

    for item in document.select(&item_sel) {
        // Featured snippets are also wrapped in div.g; they feed the answer.
        if item.select(&snippet_sel).next().is_some() {
            continue;
        }
        let title = first_text(item, &title_sel);
        if title.is_empty() {
            continue;
        }
        let Some(url) = item
            .select(&link_sel)
            .next()
            .and_then(|a| a.value().attr("href"))
            .and_then(resolve_href)
        else {
            continue;
        };
        let content = first_text(item, &content_sel);

        results.push(RawResult::new(url, title, content, results.len() + 1));
        if results.len() >= max_results {
            break;
        }
    }

    let answer = document.select(&snippet_sel).next().and_then(|block| {
        let answer = Answer {
            title: first_text(block, &title_sel),
            content: first_text(block, &snippet_content_sel),
            url: block
                .select(&snippet_link_sel)
                .find_map(|a| a.value().attr("href"))
                .and_then(resolve_href),
        };
        (!answer.is_empty()).then_some(answer)
    });

    let suggestion = document
        .select(&suggestion_sel)
        .next()
        .map(element_text)
        .filter(|s| !s.is_empty());

    tracing::debug!(
        count = results.len(),
        answer = answer.is_some(),
        "Google results parsed"
    );
    Ok(EngineResponse {
        results,
        answer,
        suggestion,
        ..Default::default()
    })
}
