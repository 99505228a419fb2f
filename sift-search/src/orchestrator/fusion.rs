//! Fusion of per-engine responses into one ranked output.
//!
//! Replies are processed in the order given, which the dispatcher keeps
//! equal to registry order, so the output is deterministic for a fixed set
//! of responses no matter when each engine finished.

use std::collections::HashMap;

use crate::orchestrator::dispatch::EngineReply;
use crate::orchestrator::scoring::{
    position_score, rank_by_weighted_frequency, sort_by_score_desc, SuggestionCandidate,
};
use crate::orchestrator::url_normalize::normalize_url;
use crate::types::{
    AggregatedResult, Attributed, EngineOutcome, EngineReport, EngineResponse, FusionOutput,
    RawResult,
};

/// Merge engine replies into a [`FusionOutput`] (plugins not yet applied).
///
/// # Pipeline
///
/// 1. Answer and sidebar arbitration: the first non-empty payload wins
///    until an engine with strictly greater weight supplies one.
/// 2. Every suggestion becomes a candidate weighted by its engine.
/// 3. Results are merged by normalised URL, accumulating
///    `engine_weight / position`. A heavier engine's title and snippet
///    replace a lighter one's.
/// 4. Results are sorted by score (stable) and the answer's URL removed.
/// 5. Suggestions are reduced by summed weight; the top one is kept.
///
/// Failed engines contribute nothing but still appear in
/// [`FusionOutput::engines`].
pub fn fuse(replies: Vec<EngineReply<EngineResponse>>, debug: bool) -> FusionOutput {
    let mut output = FusionOutput {
        debug,
        ..Default::default()
    };
    let mut merger = ResultMerger::default();
    let mut suggestions: Vec<SuggestionCandidate> = Vec::new();

    for reply in replies {
        let name = reply.engine.name();
        let weight = reply.engine.weight();

        let response = match reply.outcome {
            Ok(response) => response,
            Err(err) => {
                output.engines.push(EngineReport {
                    engine: name.to_string(),
                    weight,
                    elapsed_ms: reply.elapsed_ms,
                    outcome: EngineOutcome::Failed {
                        error: err.to_string(),
                    },
                });
                continue;
            }
        };

        if let Some(answer) = response.answer.as_ref().filter(|a| !a.is_empty()) {
            if wins_arbitration(output.answer.as_ref(), weight) {
                output.answer = Some(Attributed {
                    value: answer.clone(),
                    engine: name.to_string(),
                    engine_weight: weight,
                });
            }
        }

        if let Some(sidebar) = response.sidebar.as_ref().filter(|s| !s.is_empty()) {
            if wins_arbitration(output.sidebar.as_ref(), weight) {
                output.sidebar = Some(Attributed {
                    value: sidebar.clone(),
                    engine: name.to_string(),
                    engine_weight: weight,
                });
            }
        }

        if let Some(suggestion) = response.suggestion.as_deref().map(str::trim) {
            if !suggestion.is_empty() {
                suggestions.push(SuggestionCandidate {
                    value: suggestion.to_string(),
                    weight,
                });
            }
        }

        for raw in &response.results {
            merger.add(raw, name, weight);
        }

        output.engines.push(EngineReport {
            engine: name.to_string(),
            weight,
            elapsed_ms: reply.elapsed_ms,
            outcome: EngineOutcome::Ok { response },
        });
    }

    let answer_url = output
        .answer
        .as_ref()
        .and_then(|a| a.value.url.as_deref())
        .and_then(|url| normalize_url(url).ok());

    let mut results = merger.into_results();
    if let Some(answer_url) = answer_url {
        results.retain(|r| r.url != answer_url);
    }
    sort_by_score_desc(&mut results, |r| r.score);
    output.results = results;

    output.suggestion = rank_by_weighted_frequency(&suggestions).into_iter().next();

    tracing::debug!(
        results = output.results.len(),
        has_answer = output.answer.is_some(),
        has_sidebar = output.sidebar.is_some(),
        "fusion complete"
    );
    output
}

/// A candidate replaces the current winner only when there is none yet or
/// its engine is strictly heavier; ties keep the earlier engine.
fn wins_arbitration<T>(current: Option<&Attributed<T>>, weight: f64) -> bool {
    current.map_or(true, |current| weight > current.engine_weight)
}

/// Accumulates results by normalised URL, keeping first-seen order.
#[derive(Default)]
struct ResultMerger {
    results: Vec<AggregatedResult>,
    index: HashMap<String, usize>,
}

impl ResultMerger {
    fn add(&mut self, raw: &RawResult, engine: &str, weight: f64) {
        let url = match normalize_url(&raw.url) {
            Ok(url) => url,
            Err(err) => {
                tracing::debug!(engine, error = %err, "dropping result with unusable URL");
                return;
            }
        };

        let slot = match self.index.get(&url) {
            Some(&slot) => slot,
            None => {
                self.index.insert(url.clone(), self.results.len());
                self.results.push(AggregatedResult {
                    url,
                    title: raw.title.clone(),
                    content: raw.content.clone(),
                    score: 0.0,
                    weight,
                    engines: Vec::new(),
                });
                self.results.len() - 1
            }
        };

        let entry = &mut self.results[slot];
        if entry.weight < weight {
            entry.title = raw.title.clone();
            entry.content = raw.content.clone();
            entry.weight = weight;
        }
        entry.score += position_score(weight, raw.position);
        entry.engines.push(engine.to_string());
    }

    fn into_results(self) -> Vec<AggregatedResult> {
        self.results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Capabilities, Connector, Engine};
    use crate::error::SearchError;
    use crate::types::{Answer, Sidebar};
    use async_trait::async_trait;
    use std::sync::Arc;

    struct Stub;

    #[async_trait]
    impl Connector for Stub {
        fn capabilities(&self) -> Capabilities {
            Capabilities::SEARCH
        }
    }

    fn engine(name: &str, weight: f64) -> Arc<Engine> {
        Arc::new(Engine::new(name, weight, Arc::new(Stub)).expect("valid engine"))
    }

    fn ok(name: &str, weight: f64, response: EngineResponse) -> EngineReply<EngineResponse> {
        EngineReply {
            engine: engine(name, weight),
            outcome: Ok(response),
            elapsed_ms: None,
        }
    }

    fn failed(name: &str, weight: f64) -> EngineReply<EngineResponse> {
        EngineReply {
            engine: engine(name, weight),
            outcome: Err(SearchError::Http("connection reset".into())),
            elapsed_ms: None,
        }
    }

    fn hit(url: &str, title: &str, position: usize) -> RawResult {
        RawResult::new(url, title, format!("{title} snippet"), position)
    }

    fn answer(title: &str, url: Option<&str>) -> Answer {
        Answer {
            title: title.into(),
            content: format!("{title} body"),
            url: url.map(str::to_string),
        }
    }

    #[test]
    fn cross_engine_scores_accumulate() {
        let output = fuse(
            vec![
                ok("a", 2.0, EngineResponse::with_results(vec![hit("https://x.com", "A x", 1)])),
                ok(
                    "b",
                    1.0,
                    EngineResponse::with_results(vec![
                        hit("https://x.com", "B x", 1),
                        hit("https://y.com", "B y", 1),
                    ]),
                ),
            ],
            false,
        );

        assert_eq!(output.results.len(), 2);
        let x = &output.results[0];
        assert_eq!(x.url, "https://x.com/");
        assert!((x.score - 3.0).abs() < f64::EPSILON);
        assert_eq!(x.title, "A x");
        assert_eq!(x.engines, ["a", "b"]);

        let y = &output.results[1];
        assert_eq!(y.url, "https://y.com/");
        assert!((y.score - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn heavier_engine_overwrites_title_even_when_later() {
        let output = fuse(
            vec![
                ok("light", 0.8, EngineResponse::with_results(vec![hit("https://x.com", "light", 2)])),
                ok("heavy", 1.2, EngineResponse::with_results(vec![hit("https://x.com/", "heavy", 5)])),
            ],
            false,
        );
        let x = &output.results[0];
        assert_eq!(x.title, "heavy");
        assert_eq!(x.content, "heavy snippet");
        assert!((x.weight - 1.2).abs() < f64::EPSILON);
        assert!((x.score - (0.8 / 2.0 + 1.2 / 5.0)).abs() < 1e-12);
    }

    #[test]
    fn stored_weight_tracks_maximum_seen() {
        let output = fuse(
            vec![
                ok("low", 0.5, EngineResponse::with_results(vec![hit("https://x.com", "low", 1)])),
                ok("high", 2.0, EngineResponse::with_results(vec![hit("https://x.com", "high", 1)])),
                ok("mid", 1.0, EngineResponse::with_results(vec![hit("https://x.com", "mid", 1)])),
            ],
            false,
        );
        // "mid" is heavier than the first writer but lighter than the best.
        assert_eq!(output.results[0].title, "high");
        assert!((output.results[0].weight - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn equal_weight_keeps_first_description() {
        let output = fuse(
            vec![
                ok("a", 1.0, EngineResponse::with_results(vec![hit("https://x.com", "first", 1)])),
                ok("b", 1.0, EngineResponse::with_results(vec![hit("https://x.com", "second", 1)])),
            ],
            false,
        );
        assert_eq!(output.results[0].title, "first");
    }

    #[test]
    fn ties_keep_merge_order() {
        let output = fuse(
            vec![
                ok("a", 1.0, EngineResponse::with_results(vec![hit("https://first.com", "1", 1)])),
                ok("b", 1.0, EngineResponse::with_results(vec![hit("https://second.com", "2", 1)])),
            ],
            false,
        );
        let urls: Vec<&str> = output.results.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(urls, ["https://first.com/", "https://second.com/"]);
    }

    #[test]
    fn heavier_top_engine_ranks_higher_for_same_positions() {
        let output = fuse(
            vec![
                ok("light", 1.0, EngineResponse::with_results(vec![hit("https://r2.com", "r2", 1)])),
                ok("heavy", 1.5, EngineResponse::with_results(vec![hit("https://r1.com", "r1", 1)])),
            ],
            false,
        );
        assert_eq!(output.results[0].url, "https://r1.com/");
    }

    #[test]
    fn bad_url_dropped_without_losing_siblings() {
        let output = fuse(
            vec![ok(
                "a",
                1.0,
                EngineResponse::with_results(vec![
                    hit("", "missing", 1),
                    hit("not a url", "garbage", 2),
                    hit("https://ok.com", "fine", 3),
                ]),
            )],
            false,
        );
        assert_eq!(output.results.len(), 1);
        assert_eq!(output.results[0].title, "fine");
        assert!((output.results[0].score - 1.0 / 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn failed_engine_contributes_nothing_but_is_reported() {
        let output = fuse(
            vec![
                failed("broken", 5.0),
                ok("b", 1.0, EngineResponse::with_results(vec![hit("https://b.com", "b", 1)])),
            ],
            false,
        );
        assert_eq!(output.results.len(), 1);
        assert_eq!(output.results[0].engines, ["b"]);
        assert_eq!(output.engines.len(), 2);
        assert!(matches!(output.engines[0].outcome, EngineOutcome::Failed { .. }));
        assert!(matches!(output.engines[1].outcome, EngineOutcome::Ok { .. }));
    }

    #[test]
    fn answer_arbitration_prefers_strictly_heavier_engine() {
        let with_answer = |title: &str| EngineResponse {
            answer: Some(answer(title, None)),
            ..Default::default()
        };
        let output = fuse(
            vec![
                ok("first", 1.0, with_answer("first")),
                ok("tie", 1.0, with_answer("tie")),
                ok("heavy", 1.1, with_answer("heavy")),
                ok("light", 0.5, with_answer("light")),
            ],
            false,
        );
        let answer = output.answer.expect("answer chosen");
        assert_eq!(answer.value.title, "heavy");
        assert_eq!(answer.engine, "heavy");
        assert!((answer.engine_weight - 1.1).abs() < f64::EPSILON);
    }

    #[test]
    fn tie_keeps_first_answer() {
        let with_answer = |title: &str| EngineResponse {
            answer: Some(answer(title, None)),
            ..Default::default()
        };
        let output = fuse(
            vec![ok("first", 1.0, with_answer("first")), ok("second", 1.0, with_answer("second"))],
            false,
        );
        assert_eq!(output.answer.expect("answer").engine, "first");
    }

    #[test]
    fn empty_answer_ignored() {
        let output = fuse(
            vec![ok(
                "a",
                3.0,
                EngineResponse {
                    answer: Some(Answer::default()),
                    ..Default::default()
                },
            )],
            false,
        );
        assert!(output.answer.is_none());
    }

    #[test]
    fn sidebar_arbitrated_independently_of_answer() {
        let output = fuse(
            vec![
                ok(
                    "answers",
                    2.0,
                    EngineResponse {
                        answer: Some(answer("42", None)),
                        ..Default::default()
                    },
                ),
                ok(
                    "panel",
                    1.0,
                    EngineResponse {
                        sidebar: Some(Sidebar {
                            title: "Rust".into(),
                            content: "A language".into(),
                            ..Default::default()
                        }),
                        ..Default::default()
                    },
                ),
            ],
            false,
        );
        assert_eq!(output.answer.expect("answer").engine, "answers");
        assert_eq!(output.sidebar.expect("sidebar").engine, "panel");
    }

    #[test]
    fn answer_url_excluded_from_results() {
        let output = fuse(
            vec![
                ok(
                    "google",
                    1.05,
                    EngineResponse {
                        results: vec![hit("https://answer.com/page", "answer page", 1)],
                        answer: Some(answer("featured", Some("https://ANSWER.com/page/"))),
                        ..Default::default()
                    },
                ),
                ok(
                    "bing",
                    0.8,
                    EngineResponse::with_results(vec![
                        hit("https://answer.com/page?utm_source=x", "answer again", 1),
                        hit("https://other.com", "other", 2),
                    ]),
                ),
            ],
            false,
        );
        assert_eq!(output.results.len(), 1);
        assert_eq!(output.results[0].url, "https://other.com/");
    }

    #[test]
    fn suggestion_picked_by_summed_weight() {
        let suggest = |s: &str| EngineResponse {
            suggestion: Some(s.into()),
            ..Default::default()
        };
        let output = fuse(
            vec![ok("a", 1.0, suggest("weather")), ok("google", 1.05, suggest("weathr"))],
            false,
        );
        assert_eq!(output.suggestion.as_deref(), Some("weathr"));

        let output = fuse(
            vec![
                ok("a", 1.0, suggest("weather")),
                ok("google", 1.05, suggest("weathr")),
                ok("c", 0.5, suggest("weather")),
            ],
            false,
        );
        assert_eq!(output.suggestion.as_deref(), Some("weather"));
    }

    #[test]
    fn no_suggestions_no_suggestion() {
        let output = fuse(vec![ok("a", 1.0, EngineResponse::default())], false);
        assert!(output.suggestion.is_none());
    }

    #[test]
    fn engines_list_never_empty_and_only_reporters() {
        let output = fuse(
            vec![
                ok("a", 1.0, EngineResponse::with_results(vec![hit("https://x.com", "x", 1)])),
                ok("b", 1.0, EngineResponse::with_results(vec![hit("https://y.com", "y", 1)])),
            ],
            false,
        );
        for result in &output.results {
            assert!(!result.engines.is_empty());
        }
        let x = output.results.iter().find(|r| r.url == "https://x.com/").expect("x");
        assert_eq!(x.engines, ["a"]);
    }

    #[test]
    fn repeated_url_from_one_engine_counts_each_hit() {
        let output = fuse(
            vec![ok(
                "a",
                1.0,
                EngineResponse::with_results(vec![
                    hit("https://x.com/", "x", 1),
                    hit("https://x.com/#top", "x again", 2),
                ]),
            )],
            false,
        );
        assert_eq!(output.results.len(), 1);
        assert_eq!(output.results[0].engines, ["a", "a"]);
        assert!((output.results[0].score - 1.5).abs() < 1e-9);
    }

    #[test]
    fn debug_flag_and_scratch_space() {
        let output = fuse(Vec::new(), true);
        assert!(output.debug);
        assert!(output.results.is_empty());
        assert!(output.plugins.is_empty());
    }
}
