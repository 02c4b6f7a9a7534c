//! Error types for the guidebook converter.
//!
//! Library crates use [`GuidebookError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all guidebook operations.
#[derive(Debug, thiserror::Error)]
pub enum GuidebookError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Transport-level HTTP failure (connect, TLS, body read).
    #[error("network error: {0}")]
    Network(String),

    /// The server answered with a non-success status.
    #[error("{url}: HTTP {status}")]
    Status { url: String, status: u16 },

    /// The request exceeded the configured total timeout.
    #[error("{url}: request timed out")]
    Timeout { url: String },

    /// The page has no `div.guide` container.
    #[error("Error: Could not find guide content")]
    MissingGuide,

    /// Markup or URL parsing error.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Invalid input (lesson range, template, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, GuidebookError>;

impl GuidebookError {
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

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
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
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = GuidebookError::config("bad template");
        assert_eq!(err.to_string(), "config error: bad template");

        let err = GuidebookError::Status {
            url: "https://duome.eu/guidebook/en/de/3".into(),
            status: 404,
        };
        assert_eq!(err.to_string(), "https://duome.eu/guidebook/en/de/3: HTTP 404");
    }

    #[test]
    fn missing_guide_keeps_legacy_message() {
        assert_eq!(
            GuidebookError::MissingGuide.to_string(),
            "Error: Could not find guide content"
        );
    }
}
