//! # sift-search
//!
//! Metasearch fusion: one query fans out to every registered engine, and
//! their independent ranked lists are merged into a single deduplicated
//! ranking together with an arbitrated answer, sidebar and suggestion.
//!
//! ## Design
//!
//! - Engines are [`Connector`] implementations registered by name and
//!   weight in an [`EngineRegistry`]
//! - Queries all capable engines concurrently; a slow, failing or
//!   panicking engine only loses its own contribution
//! - Results are keyed by normalised URL and scored by the harmonic sum
//!   `weight / position` across engines
//! - Answer and sidebar go to the heaviest engine that produced one
//! - A [`PluginChain`] post-processes the fused output and exposes
//!   directly invokable utilities
//!
//! ## Security
//!
//! - No network listeners; this is a library
//! - Search queries are logged only at trace level

pub mod config;
pub mod engine;
pub mod engines;
pub mod error;
pub mod http;
pub mod orchestrator;
pub mod plugins;
pub mod registry;
pub mod types;

use std::time::Duration;

pub use config::SearchConfig;
pub use engine::{Capabilities, Connector, Engine};
pub use error::{Result, SearchError};
pub use plugins::{Plugin, PluginCapability, PluginChain};
pub use registry::EngineRegistry;
pub use types::{
    AggregatedResult, Answer, Attributed, EngineOutcome, EngineReport, EngineResponse,
    FusionOutput, RawResult, RequestOptions, Sidebar,
};

/// The caller-facing entry point: a registry, a plugin chain and the
/// configuration they were built from.
pub struct Metasearch {
    registry: EngineRegistry,
    plugins: PluginChain,
    config: SearchConfig,
}

impl Metasearch {
    /// Assemble a facade from an already populated registry and chain.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if `config` does not validate.
    pub fn new(registry: EngineRegistry, plugins: PluginChain, config: SearchConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            registry,
            plugins,
            config,
        })
    }

    /// The built-in engines and plugins, configured by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if `config` does not validate.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # async fn example() -> sift_search::Result<()> {
    /// let sift = sift_search::Metasearch::with_defaults(Default::default())?;
    /// let output = sift.search("rust programming", Default::default()).await;
    /// for result in &output.results {
    ///     println!("{:.3} {}", result.score, result.url);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub fn with_defaults(config: SearchConfig) -> Result<Self> {
        config.validate()?;
        let mut registry = EngineRegistry::new();
        engines::register_builtin(&mut registry, &config)?;
        let plugins = plugins::builtin_plugins(&config)?;
        tracing::debug!(
            engines = registry.len(),
            plugins = plugins.names().len(),
            "metasearch ready"
        );
        Self::new(registry, plugins, config)
    }

    /// Search every engine and return the fused, plugin-processed output.
    ///
    /// Never fails: engines that error or time out are listed in
    /// [`FusionOutput::engines`] with their failure and contribute nothing.
    pub async fn search(&self, query: &str, options: RequestOptions) -> FusionOutput {
        let replies =
            orchestrator::dispatch::dispatch_search(&self.registry, query, options, self.timeout())
                .await;
        let output = orchestrator::fusion::fuse(replies, options.debug);
        self.plugins.apply(output).await
    }

    /// Fused completions for `partial_query`, best first. A blank query
    /// returns an empty list without contacting any engine.
    pub async fn autocomplete(&self, partial_query: &str) -> Vec<String> {
        let replies = orchestrator::dispatch::dispatch_autocomplete(
            &self.registry,
            partial_query,
            self.timeout(),
        )
        .await;
        orchestrator::autocomplete::fuse_autocomplete(&replies)
    }

    /// Call a plugin directly.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::UnknownPlugin`] for a missing or non-invokable
    /// plugin, or the plugin's own error.
    pub async fn invoke_plugin(
        &self,
        name: &str,
        options: serde_json::Value,
    ) -> Result<serde_json::Value> {
        self.plugins.invoke(name, options).await
    }

    /// The registered engines.
    pub fn registry(&self) -> &EngineRegistry {
        &self.registry
    }

    /// The plugin pipeline.
    pub fn plugins(&self) -> &PluginChain {
        &self.plugins
    }

    /// The active configuration.
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    fn timeout(&self) -> Duration {
        Duration::from_millis(self.config.timeout_ms)
    }
}
