//! Error types for the tapewatch system.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the tapewatch system.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Market data could not be retrieved (network, timeout, bad status).
    #[error("Transport error: {0}")]
    Transport(String),

    /// The data source does not offer the requested series.
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// Data error (malformed or missing fields).
    #[error("Data error: {0}")]
    Data(String),

    /// Insufficient data for computation.
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// Notification delivery error.
    #[error("Notification error: {0}")]
    Notify(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Create a transport error.
    pub fn transport(msg: impl Into<String>) -> Self {
        Error::Transport(msg.into())
    }

    /// Create an unsupported-operation error.
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Error::Unsupported(msg.into())
    }

    /// Create a data error.
    pub fn data(msg: impl Into<String>) -> Self {
        Error::Data(msg.into())
    }

    /// Create an insufficient data error.
    pub fn insufficient_data(msg: impl Into<String>) -> Self {
        Error::InsufficientData(msg.into())
    }

    /// Create a notification error.
    pub fn notify(msg: impl Into<String>) -> Self {
        Error::Notify(msg.into())
    }

    /// True for failures that mean "no usable data this run" rather than a
    /// broken run.
    pub fn is_no_data(&self) -> bool {
        matches!(self, Error::Transport(_) | Error::Unsupported(_))
    }
}
