//! Fusion of per-engine autocomplete lists.

use std::collections::HashMap;

use serde::Serialize;

use crate::orchestrator::dispatch::EngineReply;
use crate::orchestrator::scoring::{position_score, sort_by_score_desc};

/// One completion with its accumulated score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredCompletion {
    /// The completed query.
    pub value: String,
    /// Sum of `engine_weight / position` over every engine listing it.
    pub score: f64,
    /// Engines that listed it, in processing order.
    pub engines: Vec<String>,
}

/// Score every completion across engines, highest score first.
///
/// Failed engines are skipped. Equal scores keep first-seen order.
pub fn score_completions(replies: &[EngineReply<Vec<String>>]) -> Vec<ScoredCompletion> {
    let mut scored: Vec<ScoredCompletion> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for reply in replies {
        let Ok(completions) = &reply.outcome else {
            continue;
        };
        let weight = reply.engine.weight();

        for (offset, value) in completions.iter().enumerate() {
            let slot = *index.entry(value.as_str()).or_insert_with(|| {
                scored.push(ScoredCompletion {
                    value: value.clone(),
                    score: 0.0,
                    engines: Vec::new(),
                });
                scored.len() - 1
            });
            let entry = &mut scored[slot];
            entry.score += position_score(weight, offset + 1);
            entry.engines.push(reply.engine.name().to_string());
        }
    }

    sort_by_score_desc(&mut scored, |c| c.score);
    scored
}

/// Merge autocomplete replies into one list ordered by accumulated score.
pub fn fuse_autocomplete(replies: &[EngineReply<Vec<String>>]) -> Vec<String> {
    score_completions(replies)
        .into_iter()
        .map(|completion| completion.value)
        .collect()
}
