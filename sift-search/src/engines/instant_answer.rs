//! DuckDuckGo Instant Answer connector.
//!
//! Produces no ranked results. It contributes a direct answer (computed
//! answers or dictionary definitions) and a knowledge-panel sidebar built
//! from the topic abstract, and is weighted above the scrapers so its
//! answer wins arbitration.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::SearchConfig;
use crate::engine::{Capabilities, Connector};
use crate::error::SearchError;
use crate::http;
use crate::types::{Answer, EngineResponse, RequestOptions, Sidebar};

/// Registered name.
pub const NAME: &str = "instant_answer";

const API_URL: &str = "https://api.duckduckgo.com/";
const IMAGE_BASE: &str = "https://duckduckgo.com";

/// Factory used by the built-in registration list.
pub fn connector(config: &SearchConfig) -> Arc<dyn Connector> {
    Arc::new(InstantAnswerConnector::new(config.clone()))
}

/// Instant Answer API client.
pub struct InstantAnswerConnector {
    config: SearchConfig,
}

impl InstantAnswerConnector {
    /// Create a connector using `config` for timeouts.
    pub fn new(config: SearchConfig) -> Self {
        Self { config }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct InstantAnswerReply {
    #[serde(rename = "Heading")]
    heading: String,
    // A string for most answers, an object for some interactive ones.
    #[serde(rename = "Answer")]
    answer: serde_json::Value,
    #[serde(rename = "AbstractText")]
    abstract_text: String,
    #[serde(rename = "AbstractURL")]
    abstract_url: String,
    #[serde(rename = "Image")]
    image: String,
    #[serde(rename = "Definition")]
    definition: String,
    #[serde(rename = "DefinitionURL")]
    definition_url: String,
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

#[async_trait]
impl Connector for InstantAnswerConnector {
    fn capabilities(&self) -> Capabilities {
        Capabilities::SEARCH
    }

    fn weight(&self) -> f64 {
        1.1
    }

    async fn search(
        &self,
        query: &str,
        _options: RequestOptions,
    ) -> Result<EngineResponse, SearchError> {
        tracing::trace!(query, "Instant answer lookup");

        let client = http::build_client(&self.config)?;
        let request = client.get(API_URL).query(&[
            ("q", query),
            ("format", "json"),
            ("no_html", "1"),
            ("skip_disambig", "1"),
        ]);
        let body = http::fetch_text("Instant Answer", request).await?;

        parse_instant_answer(&body)
    }
}

/// Parse an Instant Answer API reply.
pub(crate) fn parse_instant_answer(body: &str) -> Result<EngineResponse, SearchError> {
    let reply: InstantAnswerReply = serde_json::from_str(body)
        .map_err(|e| SearchError::Parse(format!("invalid instant answer JSON: {e}")))?;

    let answer = match reply.answer.as_str().and_then(non_empty) {
        Some(content) => Some(Answer {
            title: reply.heading.trim().to_string(),
            content,
            url: None,
        }),
        None => non_empty(&reply.definition).map(|content| Answer {
            title: reply.heading.trim().to_string(),
            content,
            url: non_empty(&reply.definition_url),
        }),
    };

    let sidebar = non_empty(&reply.abstract_text).map(|content| Sidebar {
        title: reply.heading.trim().to_string(),
        content,
        url: non_empty(&reply.abstract_url),
        image: non_empty(&reply.image).map(|image| {
            if image.starts_with('/') {
                format!("{IMAGE_BASE}{image}")
            } else {
                image
            }
        }),
    });

    tracing::debug!(
        answer = answer.is_some(),
        sidebar = sidebar.is_some(),
        "Instant answer parsed"
    );
    Ok(EngineResponse {
        answer,
        sidebar,
        ..Default::default()
    })
}
