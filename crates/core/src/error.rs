//! Error types for tracelab
//!
//! Every layer reports failures through [`Error`]. Each variant maps to a
//! canonical error code that is stable across the command surface:
//!
//! | Code | Description |
//! |------|-------------|
//! | ValidationError | Bad input (empty name, malformed trace id) |
//! | NotFound | Unknown query, device or job |
//! | ArtifactNotFound | Trace file not on disk (still capturing, or capture failed) |
//! | EngineError | Engine ran and reported a problem |
//! | EngineUnavailable | Engine binary missing or not executable |
//! | EngineTimeout | Engine exceeded its deadline |
//! | CaptureError | Device capture failed |
//! | StorageError | Query store / result cache I/O failure |
//! | SerializationError | Encoding or decoding failure |
//! | ConfigError | Invalid configuration |
//! | Internal | Bug or invariant violation |

use thiserror::Error;

/// All tracelab errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Bad input supplied by the caller
    #[error("validation error: {0}")]
    Validation(String),

    /// Entity not found (query, device, job)
    #[error("not found: {0}")]
    NotFound(String),

    /// Trace artifact absent on disk
    #[error("trace {trace_id} not ready: no artifact at {path}")]
    ArtifactNotFound {
        /// Trace identifier that was requested
        trace_id: String,
        /// Path where the artifact was expected
        path: String,
    },

    /// Engine ran but reported a failure
    #[error("engine error: {0}")]
    Engine(String),

    /// Engine binary missing or could not be started
    #[error("engine unavailable: {0}")]
    EngineUnavailable(String),

    /// Engine did not finish before its deadline
    #[error("engine timed out after {secs}s")]
    EngineTimeout {
        /// Deadline that was exceeded, in seconds
        secs: u64,
    },

    /// Trace capture failed
    #[error("capture error: {0}")]
    Capture(String),

    /// Persistent store failure
    #[error("storage error: {0}")]
    Storage(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Invalid configuration
    #[error("config error: {0}")]
    Config(String),

    /// Internal error (bug or invariant violation)
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type for tracelab operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Get the canonical error code
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::Validation(_) => "ValidationError",
            Error::NotFound(_) => "NotFound",
            Error::ArtifactNotFound { .. } => "ArtifactNotFound",
            Error::Engine(_) => "EngineError",
            Error::EngineUnavailable(_) => "EngineUnavailable",
            Error::EngineTimeout { .. } => "EngineTimeout",
            Error::Capture(_) => "CaptureError",
            Error::Storage(_) | Error::Io(_) => "StorageError",
            Error::Serialization(_) => "SerializationError",
            Error::Config(_) => "ConfigError",
            Error::Internal(_) => "Internal",
        }
    }

    /// Check if this is a not-found error.
    ///
    /// A missing trace artifact counts as not found.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_) | Error::ArtifactNotFound { .. })
    }

    /// Check if this error signals a trace that is not ready yet.
    pub fn is_not_ready(&self) -> bool {
        matches!(self, Error::ArtifactNotFound { .. })
    }

    /// Check if this error is retryable.
    ///
    /// Only a missing artifact may resolve on its own (the capture can still
    /// finish). Engine failures are deterministic and are never retried.
    pub fn is_retryable(&self) -> bool {
        self.is_not_ready()
    }

    /// Check if this error originated in the analysis engine.
    pub fn is_engine_failure(&self) -> bool {
        matches!(
            self,
            Error::Engine(_) | Error::EngineUnavailable(_) | Error::EngineTimeout { .. }
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
