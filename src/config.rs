//! Host configuration file.
//!
//! A single TOML file holding the metasearch settings under `[search]` and
//! an optional log filter:
//!
//! ```toml
//! log_filter = "sift=debug"
//!
//! [search]
//! timeout_ms = 5000
//! disabled_engines = ["bing"]
//!
//! [search.weights]
//! duckduckgo = 1.2
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sift_search::SearchConfig;

use crate::error::{Result, SiftError};

/// Everything the `sift` binary reads from its config file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiftConfig {
    /// `tracing` filter directive; `RUST_LOG` takes precedence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_filter: Option<String>,
    /// Metasearch core settings.
    pub search: SearchConfig,
}

impl SiftConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or holds
    /// invalid search settings.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content).map_err(|e| SiftError::Config(e.to_string()))?;
        config.search.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self).map_err(|e| SiftError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load `path` if given, otherwise the default path when it exists,
    /// otherwise the built-in defaults.
    ///
    /// # Errors
    ///
    /// An explicitly named file must exist and parse; a broken file at the
    /// default path is also an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let default = Self::default_config_path();
                if default.is_file() {
                    Self::from_file(&default)
                } else {
                    tracing::debug!(path = %default.display(), "no config file, using defaults");
                    Ok(Self::default())
                }
            }
        }
    }

    /// Returns the default config file path: `<config dir>/sift/config.toml`.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("sift")
            .join("config.toml")
    }
}
