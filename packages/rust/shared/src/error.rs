//! Error types for pagestack.
//!
//! Library crates use [`PagestackError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all pagestack operations.
#[derive(Debug, thiserror::Error)]
pub enum PagestackError {
    /// Configuration loading or validation error (missing credentials, bad file).
    #[error("config error: {message}")]
    Config { message: String },

    /// Transport-level failure talking to the delivery API.
    #[error("network error: {0}")]
    Network(String),

    /// The delivery API answered with a non-success status.
    #[error("delivery API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Response body or query-string parsing error.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, PagestackError>;

impl PagestackError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error came from the delivery API rejecting credentials.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Api { status: 401 | 403 | 412, .. })
    }
}
