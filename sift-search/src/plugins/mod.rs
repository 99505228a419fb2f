//! Post-processing plugins.
//!
//! A plugin advertises a closed set of [`PluginCapability`] tags. The
//! [`PluginChain`] runs every `Transform` plugin in registration order,
//! each one receiving the output the previous one returned, and routes
//! direct invocations to plugins tagged `Invoke`.

pub mod engine_timings;
pub mod hash;
pub mod truncate;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::config::SearchConfig;
use crate::error::{Result, SearchError};
use crate::types::FusionOutput;

pub use engine_timings::EngineTimingsPlugin;
pub use hash::HashPlugin;
pub use truncate::TruncatePlugin;

/// What a plugin can be used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PluginCapability {
    /// Rewrites the fused output inside the search pipeline.
    Transform,
    /// Runs on demand, outside the pipeline, with caller-supplied options.
    Invoke,
}

/// A post-processing stage.
///
/// Only the methods matching the advertised capabilities are ever called.
#[async_trait]
pub trait Plugin: Send + Sync {
    /// Capability tags this plugin supports.
    fn capabilities(&self) -> &'static [PluginCapability];

    /// Return a (possibly modified) replacement for `output`.
    async fn transform(&self, output: FusionOutput) -> FusionOutput {
        output
    }

    /// Run the plugin directly.
    ///
    /// # Errors
    ///
    /// Implementation specific; typically [`SearchError::PluginOptions`].
    async fn invoke(&self, options: serde_json::Value) -> Result<serde_json::Value> {
        let _ = options;
        Err(SearchError::Unsupported("plugin invocation".into()))
    }
}

struct RegisteredPlugin {
    name: String,
    plugin: Arc<dyn Plugin>,
}

impl RegisteredPlugin {
    fn supports(&self, capability: PluginCapability) -> bool {
        self.plugin.capabilities().contains(&capability)
    }
}

/// Ordered plugin registry.
#[derive(Default)]
pub struct PluginChain {
    plugins: Vec<RegisteredPlugin>,
    index: HashMap<String, usize>,
}

impl PluginChain {
    /// An empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `plugin` under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::DuplicatePlugin`] if the name is taken.
    pub fn register(&mut self, name: impl Into<String>, plugin: Arc<dyn Plugin>) -> Result<()> {
        let name = name.into();
        if self.index.contains_key(&name) {
            return Err(SearchError::DuplicatePlugin(name));
        }
        self.index.insert(name.clone(), self.plugins.len());
        self.plugins.push(RegisteredPlugin { name, plugin });
        Ok(())
    }

    /// Names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.plugins.iter().map(|p| p.name.as_str()).collect()
    }

    /// Run every transform plugin in order, feeding each the previous
    /// plugin's result.
    pub async fn apply(&self, mut output: FusionOutput) -> FusionOutput {
        for registered in &self.plugins {
            if !registered.supports(PluginCapability::Transform) {
                continue;
            }
            tracing::trace!(plugin = %registered.name, "applying plugin");
            output = registered.plugin.transform(output).await;
        }
        output
    }

    /// Call the named plugin directly, bypassing the pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::UnknownPlugin`] if no plugin has that name or
    /// it does not support direct invocation; otherwise whatever the plugin
    /// returns.
    pub async fn invoke(&self, name: &str, options: serde_json::Value) -> Result<serde_json::Value> {
        let registered = self
            .index
            .get(name)
            .map(|&i| &self.plugins[i])
            .filter(|p| p.supports(PluginCapability::Invoke))
            .ok_or_else(|| SearchError::UnknownPlugin(name.to_string()))?;
        registered.plugin.invoke(options).await
    }
}

/// The built-in plugins, in pipeline order.
///
/// # Errors
///
/// Only fails on a name clash, which would be a programming error.
pub fn builtin_plugins(config: &SearchConfig) -> Result<PluginChain> {
    let mut chain = PluginChain::new();
    chain.register("engine_timings", Arc::new(EngineTimingsPlugin))?;
    chain.register("truncate", Arc::new(TruncatePlugin::new(config.max_results)))?;
    chain.register("hash", Arc::new(HashPlugin))?;
    Ok(chain)
}
