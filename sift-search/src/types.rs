//! Core types flowing from connectors through fusion to the caller.

use serde::{Deserialize, Serialize};

/// One hit from a single engine's own ranked list, before fusion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawResult {
    /// The URL exactly as the provider reported it (not normalised).
    pub url: String,
    /// The title of the result page.
    pub title: String,
    /// A text snippet describing the page.
    pub content: String,
    /// 1-based rank within the engine's own list.
    pub position: usize,
}

impl RawResult {
    /// Build a result at the given 1-based `position`.
    pub fn new(
        url: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
        position: usize,
    ) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            content: content.into(),
            position,
        }
    }
}

/// A direct-answer payload (featured snippet, instant answer, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    /// Heading of the answer.
    pub title: String,
    /// Answer body text.
    pub content: String,
    /// Source page of the answer, if the provider gave one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Answer {
    /// An answer with neither title nor content carries nothing to show.
    pub fn is_empty(&self) -> bool {
        self.title.trim().is_empty() && self.content.trim().is_empty()
    }
}

/// A knowledge-panel style payload shown beside the results.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sidebar {
    /// Heading of the panel.
    pub title: String,
    /// Panel body text.
    pub content: String,
    /// Source page of the panel.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Image shown in the panel.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Sidebar {
    /// A sidebar with neither title nor content carries nothing to show.
    pub fn is_empty(&self) -> bool {
        self.title.trim().is_empty() && self.content.trim().is_empty()
    }
}

/// Per-engine, per-query response produced by a connector's search call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineResponse {
    /// The engine's ranked results.
    #[serde(default)]
    pub results: Vec<RawResult>,
    /// Direct answer, if the engine produced one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<Answer>,
    /// Sidebar panel, if the engine produced one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sidebar: Option<Sidebar>,
    /// Single corrected or related query.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    /// Wall-clock time of the connector call, set by the dispatcher in
    /// debug mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elapsed_ms: Option<u64>,
    /// Registered name of the producing engine, set by the dispatcher.
    #[serde(default)]
    pub engine: String,
}

impl EngineResponse {
    /// A response carrying only ranked results.
    pub fn with_results(results: Vec<RawResult>) -> Self {
        Self {
            results,
            ..Default::default()
        }
    }
}

/// A payload together with the engine that won arbitration for it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attributed<T> {
    /// The winning payload.
    #[serde(flatten)]
    pub value: T,
    /// Name of the engine that supplied it.
    pub engine: String,
    /// Weight of that engine; later candidates must beat it strictly.
    pub engine_weight: f64,
}

/// One deduplicated entry of the fused result list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedResult {
    /// Normalised URL, the deduplication key.
    pub url: String,
    /// Title from the highest-weight contributing engine.
    pub title: String,
    /// Snippet from the highest-weight contributing engine.
    pub content: String,
    /// Sum of `engine_weight / position` over every contribution.
    pub score: f64,
    /// Highest engine weight that has contributed so far.
    pub weight: f64,
    /// Contributing engines in processing order, one entry per contributed
    /// hit. Never empty.
    pub engines: Vec<String>,
}

/// What happened when one engine was queried.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EngineOutcome {
    /// The connector answered.
    Ok {
        /// The connector's response.
        response: EngineResponse,
    },
    /// The connector failed, panicked or timed out.
    Failed {
        /// Rendered failure.
        error: String,
    },
}

/// Diagnostic record of one engine's participation in a query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineReport {
    /// Registered engine name.
    pub engine: String,
    /// Engine weight used during fusion.
    pub weight: f64,
    /// Connector call duration, present in debug mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elapsed_ms: Option<u64>,
    /// Response or failure.
    #[serde(flatten)]
    pub outcome: EngineOutcome,
}

/// The fused response handed to the plugin chain and then to the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FusionOutput {
    /// Ranked, deduplicated results (the answer's URL excluded).
    pub results: Vec<AggregatedResult>,
    /// The winning direct answer.
    pub answer: Option<Attributed<Answer>>,
    /// The winning sidebar.
    pub sidebar: Option<Attributed<Sidebar>>,
    /// The top suggestion after weighted frequency reduction.
    pub suggestion: Option<String>,
    /// Whether the request asked for debug information.
    pub debug: bool,
    /// One report per queried engine, in registry order.
    pub engines: Vec<EngineReport>,
    /// Scratch space written by plugins.
    pub plugins: serde_json::Map<String, serde_json::Value>,
}

/// Per-request options passed through to connectors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestOptions {
    /// Time each connector call and attach the duration to its response.
    #[serde(default)]
    pub debug: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answer_empty_when_title_and_content_blank() {
        let answer = Answer {
            title: "  ".into(),
            content: String::new(),
            url: Some("https://example.com".into()),
        };
        assert!(answer.is_empty());

        let answer = Answer {
            title: String::new(),
            content: "42".into(),
            url: None,
        };
        assert!(!answer.is_empty());
    }

    #[test]
    fn sidebar_empty_when_title_and_content_blank() {
        assert!(Sidebar::default().is_empty());
        let sidebar = Sidebar {
            title: "Rust".into(),
            ..Default::default()
        };
        assert!(!sidebar.is_empty());
    }

    #[test]
    fn attributed_answer_serializes_flat() {
        let attributed = Attributed {
            value: Answer {
                title: "Answer".into(),
                content: "42".into(),
                url: None,
            },
            engine: "google".into(),
            engine_weight: 1.05,
        };
        let json = serde_json::to_value(&attributed).expect("serialize");
        assert_eq!(json["title"], "Answer");
        assert_eq!(json["engine"], "google");
        assert!(json.get("url").is_none());
    }

    #[test]
    fn engine_report_serializes_status_tag() {
        let report = EngineReport {
            engine: "bing".into(),
            weight: 0.8,
            elapsed_ms: None,
            outcome: EngineOutcome::Failed {
                error: "HTTP error: 503".into(),
            },
        };
        let json = serde_json::to_value(&report).expect("serialize");
        assert_eq!(json["status"], "failed");
        assert_eq!(json["error"], "HTTP error: 503");
        assert!(json.get("elapsed_ms").is_none());
    }

    #[test]
    fn engine_response_deserializes_with_defaults() {
        let response: EngineResponse =
            serde_json::from_str(r#"{"suggestion": "weather"}"#).expect("deserialize");
        assert!(response.results.is_empty());
        assert_eq!(response.suggestion.as_deref(), Some("weather"));
        assert!(response.answer.is_none());
    }

    #[test]
    fn request_options_default_is_not_debug() {
        assert!(!RequestOptions::default().debug);
    }
}
