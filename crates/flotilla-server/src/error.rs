//! Error types for the fleet server binary.
//!
//! [`FlotillaError`] is the top-level error type that wraps all possible
//! failure modes during server startup and message ingest.

/// Top-level error for the fleet server binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum FlotillaError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: flotilla_core::ConfigError,
    },

    /// Bus connection or messaging failed.
    #[error("bus error: {source}")]
    Bus {
        /// The underlying bus error.
        #[from]
        source: flotilla_core::BusError,
    },

    /// The API server failed to start.
    #[error("api error: {source}")]
    Api {
        /// The underlying startup error.
        #[from]
        source: flotilla_api::StartupError,
    },

    /// A state report payload could not be decoded.
    #[error("parse error: {message}")]
    Parse {
        /// Description of the malformed payload.
        message: String,
    },
}
