//! Error types for the driver binary.
//!
//! [`EngineError`] is the top-level error type that wraps all possible
//! failure modes while loading configuration, running the demonstration
//! worlds, and rendering their reports.

/// Top-level error for the driver binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: foresight_core::ConfigError,
    },

    /// A rollout or planning step failed.
    #[error("rollout error: {source}")]
    Rollout {
        /// The underlying rollout error.
        #[from]
        source: foresight_core::RolloutError,
    },

    /// A summary could not be rendered as JSON.
    #[error("report error: {source}")]
    Report {
        /// The underlying serialization error.
        #[from]
        source: serde_json::Error,
    },
}
