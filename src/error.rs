//! Error types for ab-verdict
//!
//! Toyota Way: Clear error messages with actionable guidance (Respect for People)
//!
//! Every error is raised before any partial result exists. Nothing here is
//! transient, so nothing is retried.

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// ab-verdict error types
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed or internally inconsistent experiment configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A variant fails the constraints of its metric kind
    #[error("Invalid variant: {0}")]
    InvalidVariant(String),

    /// Monitoring window or look count inconsistent with the sequential design
    #[error("Sequential schedule error: {0}\nCheck the start/end dates and the interim look count")]
    SequentialSchedule(String),

    /// Request envelope could not be decoded
    #[error("Request decode error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Stable machine-readable kind name, for transport layers mapping
    /// errors to user-facing messages.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::InvalidConfiguration(_) => "invalid_configuration",
            Self::InvalidVariant(_) => "invalid_variant",
            Self::SequentialSchedule(_) => "sequential_schedule",
            Self::Json(_) => "request_decode",
            Self::Io(_) => "io",
        }
    }
}
