//! Caps the fused result list at `max_results`.

use async_trait::async_trait;

use super::{Plugin, PluginCapability};
use crate::types::FusionOutput;

/// Keeps the top `max_results` results and records how many were dropped
/// under `plugins.truncated`.
#[derive(Debug, Clone, Copy)]
pub struct TruncatePlugin {
    max_results: usize,
}

impl TruncatePlugin {
    /// Keep at most `max_results` results.
    pub fn new(max_results: usize) -> Self {
        Self { max_results }
    }
}

#[async_trait]
impl Plugin for TruncatePlugin {
    fn capabilities(&self) -> &'static [PluginCapability] {
        &[PluginCapability::Transform]
    }

    async fn transform(&self, mut output: FusionOutput) -> FusionOutput {
        let total = output.results.len();
        if total > self.max_results {
            output.results.truncate(self.max_results);
            output
                .plugins
                .insert("truncated".into(), serde_json::json!(total - self.max_results));
        }
        output
    }
}
