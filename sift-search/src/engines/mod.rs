//! Built-in connectors and their registration list.
//!
//! Adding a connector means writing a [`Connector`] implementation and
//! appending one factory to [`builtin_factories`]; the fusion core never
//! changes.

pub mod bing;
pub mod duckduckgo;
pub mod google;
pub mod instant_answer;

use std::sync::Arc;

use scraper::{ElementRef, Selector};

use crate::config::SearchConfig;
use crate::engine::{Connector, Engine};
use crate::error::{Result, SearchError};
use crate::registry::EngineRegistry;

pub use bing::BingConnector;
pub use duckduckgo::DuckDuckGoConnector;
pub use google::GoogleConnector;
pub use instant_answer::InstantAnswerConnector;

/// Builds a connector from the shared configuration.
pub type ConnectorFactory = fn(&SearchConfig) -> Arc<dyn Connector>;

/// Built-in connectors in registration order. Registry order breaks score
/// ties, so answer providers come first.
const BUILTIN: &[(&str, ConnectorFactory)] = &[
    (instant_answer::NAME, instant_answer::connector),
    (google::NAME, google::connector),
    (duckduckgo::NAME, duckduckgo::connector),
    (bing::NAME, bing::connector),
];

/// The built-in connector factories, in registration order.
pub fn builtin_factories() -> &'static [(&'static str, ConnectorFactory)] {
    BUILTIN
}

/// Register every enabled built-in connector, applying weight overrides.
///
/// # Errors
///
/// Returns [`SearchError::DuplicateEngine`] if one of the names is already
/// taken, or [`SearchError::Config`] for an invalid weight.
pub fn register_builtin(registry: &mut EngineRegistry, config: &SearchConfig) -> Result<()> {
    for (name, factory) in builtin_factories() {
        if !config.is_enabled(name) {
            tracing::debug!(engine = name, "engine disabled by config");
            continue;
        }
        let connector = factory(config);
        let weight = config.weight_for(name, connector.weight());
        registry.register(Engine::new(*name, weight, connector)?)?;
    }
    Ok(())
}

/// Parse a CSS selector, reporting failures as [`SearchError::Parse`].
pub(crate) fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| SearchError::Parse(format!("invalid selector {css:?}: {e:?}")))
}

/// Text content of `element` with whitespace runs collapsed.
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse an OpenSearch suggestions reply: `["query", ["s1", "s2", ...], ...]`.
pub(crate) fn parse_suggestion_list(body: &str) -> Result<Vec<String>> {
    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| SearchError::Parse(format!("invalid suggestions JSON: {e}")))?;
    let list = value
        .get(1)
        .and_then(serde_json::Value::as_array)
        .ok_or_else(|| SearchError::Parse("suggestions JSON has no list".into()))?;
    Ok(list
        .iter()
        .filter_map(serde_json::Value::as_str)
        .map(str::to_string)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    #[test]
    fn builtin_names_are_unique() {
        let mut names: Vec<&str> = builtin_factories().iter().map(|(n, _)| *n).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), builtin_factories().len());
    }

    #[test]
    fn register_all_builtins_in_order() {
        let mut registry = EngineRegistry::new();
        register_builtin(&mut registry, &SearchConfig::default()).expect("register");
        let names: Vec<&str> = registry.all().iter().map(|e| e.name()).collect();
        assert_eq!(names, ["instant_answer", "google", "duckduckgo", "bing"]);
        let google = registry.get("google").expect("google");
        assert!((google.weight() - 1.05).abs() < f64::EPSILON);
    }

    #[test]
    fn disabled_engines_skipped_and_weights_overridden() {
        let mut config = SearchConfig {
            disabled_engines: vec!["bing".into()],
            ..Default::default()
        };
        config.weights.insert("duckduckgo".into(), 1.5);

        let mut registry = EngineRegistry::new();
        register_builtin(&mut registry, &config).expect("register");
        assert!(registry.get("bing").is_none());
        let ddg = registry.get("duckduckgo").expect("duckduckgo");
        assert!((ddg.weight() - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn registering_twice_is_a_duplicate() {
        let mut registry = EngineRegistry::new();
        register_builtin(&mut registry, &SearchConfig::default()).expect("register");
        let err = register_builtin(&mut registry, &SearchConfig::default()).unwrap_err();
        assert!(matches!(err, SearchError::DuplicateEngine(_)));
    }

    #[test]
    fn element_text_collapses_whitespace() {
        let html = Html::parse_fragment("<p>\n  Rust   <b>Programming</b>\n Language </p>");
        let p = selector("p").expect("selector");
        let element = html.select(&p).next().expect("p element");
        assert_eq!(element_text(element), "Rust Programming Language");
    }

    #[test]
    fn suggestion_list_parsed() {
        let parsed = parse_suggestion_list(r#"["rus",["rust","rust lang",7]]"#).expect("parse");
        assert_eq!(parsed, ["rust", "rust lang"]);
    }

    #[test]
    fn malformed_suggestion_list_rejected() {
        assert!(parse_suggestion_list("{}").is_err());
        assert!(parse_suggestion_list("not json").is_err());
    }
}
