//! Static engine registry.
//!
//! Populated once at startup and read-only afterwards. Iteration order is
//! registration order, which is the tie-break order everywhere scores are
//! equal.

use std::collections::HashMap;
use std::sync::Arc;

use crate::engine::{Connector, Engine};
use crate::error::{Result, SearchError};

/// Ordered mapping from engine name to [`Engine`].
#[derive(Debug, Default, Clone)]
pub struct EngineRegistry {
    engines: Vec<Arc<Engine>>,
    index: HashMap<String, usize>,
}

impl EngineRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an engine.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::DuplicateEngine`] if an engine with the same
    /// name is already registered.
    pub fn register(&mut self, engine: Engine) -> Result<()> {
        if self.index.contains_key(engine.name()) {
            return Err(SearchError::DuplicateEngine(engine.name().to_string()));
        }
        tracing::debug!(engine = engine.name(), weight = engine.weight(), "engine registered");
        self.index.insert(engine.name().to_string(), self.engines.len());
        self.engines.push(Arc::new(engine));
        Ok(())
    }

    /// Register `connector` under `name` with its declared weight.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::DuplicateEngine`] on a name clash, or
    /// [`SearchError::Config`] if the declared weight is invalid.
    pub fn register_connector(
        &mut self,
        name: impl Into<String>,
        connector: Arc<dyn Connector>,
    ) -> Result<()> {
        self.register(Engine::from_connector(name, connector)?)
    }

    /// All engines in registration order.
    pub fn all(&self) -> &[Arc<Engine>] {
        &self.engines
    }

    /// Look up an engine by name.
    pub fn get(&self, name: &str) -> Option<&Arc<Engine>> {
        self.index.get(name).map(|&i| &self.engines[i])
    }

    /// Number of registered engines.
    pub fn len(&self) -> usize {
        self.engines.len()
    }

    /// Whether no engine is registered.
    pub fn is_empty(&self) -> bool {
        self.engines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Capabilities;
    use async_trait::async_trait;

    struct Stub;

    #[async_trait]
    impl Connector for Stub {
        fn capabilities(&self) -> Capabilities {
            Capabilities::SEARCH
        }
    }

    fn engine(name: &str, weight: f64) -> Engine {
        Engine::new(name, weight, Arc::new(Stub)).expect("valid engine")
    }

    #[test]
    fn register_and_lookup() {
        let mut registry = EngineRegistry::new();
        registry.register(engine("google", 1.05)).expect("register");
        let found = registry.get("google").expect("google registered");
        assert!((found.weight() - 1.05).abs() < f64::EPSILON);
        assert!(registry.get("bing").is_none());
    }

    #[test]
    fn duplicate_name_rejected() {
        let mut registry = EngineRegistry::new();
        registry.register(engine("google", 1.0)).expect("register");
        let err = registry.register(engine("google", 2.0)).unwrap_err();
        assert!(matches!(err, SearchError::DuplicateEngine(ref n) if n == "google"));
        // The original registration is untouched.
        assert_eq!(registry.len(), 1);
        assert!((registry.all()[0].weight() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn iteration_follows_registration_order() {
        let mut registry = EngineRegistry::new();
        for name in ["c", "a", "b"] {
            registry.register(engine(name, 1.0)).expect("register");
        }
        let names: Vec<&str> = registry.all().iter().map(|e| e.name()).collect();
        assert_eq!(names, ["c", "a", "b"]);
    }

    #[test]
    fn register_connector_uses_declared_weight() {
        let mut registry = EngineRegistry::new();
        registry
            .register_connector("stub", Arc::new(Stub))
            .expect("register");
        assert!((registry.all()[0].weight() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_registry() {
        let registry = EngineRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.all().is_empty());
    }
}
