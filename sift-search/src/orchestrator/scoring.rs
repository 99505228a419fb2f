//! Weighted scoring shared by result fusion, suggestion reduction and
//! autocomplete.
//!
//! Formula: `score = engine_weight / position` (harmonic position decay).
//! An engine's first hit contributes its full weight, the second half of
//! it, the third a third, and so on.

use std::collections::HashMap;

use serde::Serialize;

/// Contribution of one hit at 1-based `position` from an engine with
/// `engine_weight`.
///
/// Positions below 1 are treated as 1.
///
/// ```
/// use sift_search::orchestrator::scoring::position_score;
///
/// assert_eq!(position_score(2.0, 1), 2.0);
/// assert_eq!(position_score(1.0, 2), 0.5);
/// ```
pub fn position_score(engine_weight: f64, position: usize) -> f64 {
    engine_weight / position.max(1) as f64
}

/// Stable sort by descending score. Equal scores keep their relative
/// order, so registry order decides ties.
pub fn sort_by_score_desc<T>(items: &mut [T], score: impl Fn(&T) -> f64) {
    items.sort_by(|a, b| score(b).total_cmp(&score(a)));
}

/// A suggested query from one engine, weighted by that engine's weight.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuggestionCandidate {
    /// The suggested query.
    pub value: String,
    /// Weight of the suggesting engine.
    pub weight: f64,
}

/// Group candidates by value, summing weights, and return the values
/// ordered by summed weight (highest first).
///
/// Values with equal sums keep first-seen order.
pub fn rank_by_weighted_frequency(candidates: &[SuggestionCandidate]) -> Vec<String> {
    let mut totals: Vec<(&str, f64)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for candidate in candidates {
        match index.get(candidate.value.as_str()) {
            Some(&i) => totals[i].1 += candidate.weight,
            None => {
                index.insert(candidate.value.as_str(), totals.len());
                totals.push((candidate.value.as_str(), candidate.weight));
            }
        }
    }

    sort_by_score_desc(&mut totals, |(_, total)| *total);
    totals.into_iter().map(|(value, _)| value.to_string()).collect()
}
