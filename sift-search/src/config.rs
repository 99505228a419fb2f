//! Search configuration with sensible defaults.
//!
//! [`SearchConfig`] controls the per-engine timeout, how many results
//! connectors parse and the `truncate` plugin keeps, which built-in
//! engines are registered and with which weights.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::SearchError;

/// Configuration for the metasearch core.
///
/// Use [`Default::default()`] for sensible defaults, or construct with
/// field overrides for custom behaviour. Deserialises from partial TOML;
/// missing fields take their default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// How long the dispatcher waits for one connector before treating it
    /// as failed, in milliseconds.
    pub timeout_ms: u64,
    /// Maximum number of results per engine and in the final list.
    pub max_results: usize,
    /// Whether to request safe search filtering from engines that support it.
    pub safe_search: bool,
    /// Custom User-Agent string. If `None`, rotates through a built-in list
    /// of realistic browser User-Agents.
    pub user_agent: Option<String>,
    /// Built-in engines that are not registered.
    pub disabled_engines: Vec<String>,
    /// Weight overrides keyed by engine name, applied at registration.
    pub weights: BTreeMap<String, f64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 8_000,
            max_results: 10,
            safe_search: true,
            user_agent: None,
            disabled_engines: Vec::new(),
            weights: BTreeMap::new(),
        }
    }
}

impl SearchConfig {
    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - `max_results` must be greater than 0
    /// - `timeout_ms` must be greater than 0
    /// - every weight override must be finite and greater than 0
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.max_results == 0 {
            return Err(SearchError::Config(
                "max_results must be greater than 0".into(),
            ));
        }
        if self.timeout_ms == 0 {
            return Err(SearchError::Config(
                "timeout_ms must be greater than 0".into(),
            ));
        }
        for (engine, weight) in &self.weights {
            if !weight.is_finite() || *weight <= 0.0 {
                return Err(SearchError::Config(format!(
                    "weight for {engine} must be a positive number, got {weight}"
                )));
            }
        }
        Ok(())
    }

    /// Whether the named built-in engine should be registered.
    pub fn is_enabled(&self, engine: &str) -> bool {
        !self.disabled_engines.iter().any(|d| d == engine)
    }

    /// The configured weight for `engine`, or `declared` when not overridden.
    pub fn weight_for(&self, engine: &str, declared: f64) -> f64 {
        self.weights.get(engine).copied().unwrap_or(declared)
    }
}
