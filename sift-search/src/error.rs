//! Error types for the sift-search crate.
//!
//! Per-item failures (a bad result URL, a failing engine) are caught close
//! to where they happen and only degrade the fused output. The variants
//! that reach a caller are registration conflicts, invalid configuration
//! and direct invocation of an unknown plugin.

/// Errors that can occur while registering engines, querying them, or
/// running plugins.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// A connector call failed or panicked.
    #[error("engine {engine} failed: {message}")]
    Engine {
        /// Registered name of the failing engine.
        engine: String,
        /// Failure description.
        message: String,
    },

    /// A connector did not answer within the per-engine timeout.
    #[error("search timed out: {0}")]
    Timeout(String),

    /// An HTTP request to a search provider failed.
    #[error("HTTP error: {0}")]
    Http(String),

    /// Failed to parse a provider response.
    #[error("parse error: {0}")]
    Parse(String),

    /// A result URL could not be normalised.
    #[error("invalid result URL {url:?}: {reason}")]
    UrlNormalization {
        /// The URL as the engine reported it.
        url: String,
        /// Why normalisation failed.
        reason: String,
    },

    /// An engine with the same name is already registered.
    #[error("duplicate engine: {0}")]
    DuplicateEngine(String),

    /// A plugin with the same name is already registered.
    #[error("duplicate plugin: {0}")]
    DuplicatePlugin(String),

    /// No plugin with this name supports direct invocation.
    #[error("unknown plugin: {0}")]
    UnknownPlugin(String),

    /// A plugin was invoked with options it cannot use.
    #[error("invalid plugin options: {0}")]
    PluginOptions(String),

    /// A connector was asked for a capability it does not provide.
    #[error("unsupported operation: {0}")]
    Unsupported(String),

    /// Invalid configuration.
    #[error("config error: {0}")]
    Config(String),
}

/// Convenience type alias for sift-search results.
pub type Result<T> = std::result::Result<T, SearchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_engine_failure() {
        let err = SearchError::Engine {
            engine: "bing".into(),
            message: "connection refused".into(),
        };
        assert_eq!(err.to_string(), "engine bing failed: connection refused");
    }

    #[test]
    fn display_timeout() {
        let err = SearchError::Timeout("google exceeded 8000ms".into());
        assert_eq!(err.to_string(), "search timed out: google exceeded 8000ms");
    }

    #[test]
    fn display_url_normalization() {
        let err = SearchError::UrlNormalization {
            url: "/relative".into(),
            reason: "relative URL without a base".into(),
        };
        assert_eq!(
            err.to_string(),
            "invalid result URL \"/relative\": relative URL without a base"
        );
    }

    #[test]
    fn display_registration_conflicts() {
        assert_eq!(
            SearchError::DuplicateEngine("google".into()).to_string(),
            "duplicate engine: google"
        );
        assert_eq!(
            SearchError::DuplicatePlugin("truncate".into()).to_string(),
            "duplicate plugin: truncate"
        );
    }

    #[test]
    fn display_unknown_plugin() {
        let err = SearchError::UnknownPlugin("calculator".into());
        assert_eq!(err.to_string(), "unknown plugin: calculator");
    }

    #[test]
    fn display_plugin_options() {
        let err = SearchError::PluginOptions("missing text".into());
        assert_eq!(err.to_string(), "invalid plugin options: missing text");
    }

    #[test]
    fn display_config() {
        let err = SearchError::Config("max_results must be greater than 0".into());
        assert_eq!(
            err.to_string(),
            "config error: max_results must be greater than 0"
        );
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SearchError>();
    }
}
