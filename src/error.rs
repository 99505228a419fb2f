//! Error types for the sift host.

/// Top-level error type for the host process.
#[derive(Debug, thiserror::Error)]
pub enum SiftError {
    /// Configuration file could not be parsed or serialised.
    #[error("config error: {0}")]
    Config(String),

    /// The stdio protocol channel failed.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error from the metasearch core.
    #[error(transparent)]
    Search(#[from] sift_search::SearchError),
}

/// Convenience alias for host results.
pub type Result<T> = std::result::Result<T, SiftError>;
