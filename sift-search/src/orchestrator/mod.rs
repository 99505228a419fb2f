//! Search orchestrator: concurrent fan-out, fusion, scoring, autocomplete.
//!
//! This module fans queries out to every capable engine concurrently,
//! merges results by normalised URL with weighted position-decay scoring,
//! arbitrates answers and sidebars by engine weight, and ranks suggestions
//! and completions by accumulated weight.

pub mod autocomplete;
pub mod dispatch;
pub mod fusion;
pub mod scoring;
pub mod url_normalize;
