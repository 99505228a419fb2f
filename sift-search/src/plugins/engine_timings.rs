//! Debug-mode summary of how long each engine took.

use async_trait::async_trait;

use super::{Plugin, PluginCapability};
use crate::types::FusionOutput;

/// When the request asked for debug output, writes
/// `plugins.engine_timings = {engine: elapsed_ms}` for every timed engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct EngineTimingsPlugin;

#[async_trait]
impl Plugin for EngineTimingsPlugin {
    fn capabilities(&self) -> &'static [PluginCapability] {
        &[PluginCapability::Transform]
    }

    async fn transform(&self, mut output: FusionOutput) -> FusionOutput {
        if !output.debug {
            return output;
        }
        let timings: serde_json::Map<String, serde_json::Value> = output
            .engines
            .iter()
            .filter_map(|report| {
                report
                    .elapsed_ms
                    .map(|ms| (report.engine.clone(), serde_json::json!(ms)))
            })
            .collect();
        output
            .plugins
            .insert("engine_timings".into(), serde_json::Value::Object(timings));
        output
    }
}
