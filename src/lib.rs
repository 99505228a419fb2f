//! # sift
//!
//! Process host for the [`sift_search`] metasearch core: TOML
//! configuration, logging setup, and a newline-delimited JSON protocol on
//! stdin/stdout.

pub mod config;
pub mod error;
pub mod host;

pub use config::SiftConfig;
pub use error::{Result, SiftError};
pub use sift_search::Metasearch;

/// Default `tracing` filter when neither `RUST_LOG` nor the config sets one.
pub const DEFAULT_LOG_FILTER: &str = "sift=info,sift_search=info";
