//! Direct-invocation plugin computing hex digests.

use async_trait::async_trait;
use serde::Deserialize;
use sha2::{Digest, Sha256, Sha512};

use super::{Plugin, PluginCapability};
use crate::error::{Result, SearchError};

/// Options: `{"text": "...", "algorithm": "sha256" | "sha512"}`.
/// Returns `{"algorithm": ..., "digest": "<hex>"}`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HashPlugin;

#[derive(Deserialize)]
struct HashOptions {
    text: String,
    #[serde(default = "default_algorithm")]
    algorithm: String,
}

fn default_algorithm() -> String {
    "sha256".to_string()
}

#[async_trait]
impl Plugin for HashPlugin {
    fn capabilities(&self) -> &'static [PluginCapability] {
        &[PluginCapability::Invoke]
    }

    async fn invoke(&self, options: serde_json::Value) -> Result<serde_json::Value> {
        let options: HashOptions = serde_json::from_value(options)
            .map_err(|e| SearchError::PluginOptions(format!("hash: {e}")))?;

        let algorithm = options.algorithm.to_lowercase();
        let digest = match algorithm.as_str() {
            "sha256" => format!("{:x}", Sha256::digest(options.text.as_bytes())),
            "sha512" => format!("{:x}", Sha512::digest(options.text.as_bytes())),
            other => {
                return Err(SearchError::PluginOptions(format!(
                    "hash: unsupported algorithm {other}"
                )))
            }
        };

        Ok(serde_json::json!({ "algorithm": algorithm, "digest": digest }))
    }
}
