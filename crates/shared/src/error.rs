//! Error types for askglean.
//!
//! Library crates use [`AskGleanError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all askglean operations.
#[derive(Debug, thiserror::Error)]
pub enum AskGleanError {
    /// Configuration loading or validation error. Fatal.
    #[error("config error: {message}")]
    Config { message: String },

    /// Malformed input CSV, usually a wrong or missing header row. Fatal.
    #[error("input format error: {message}")]
    InputFormat { message: String },

    /// The API rejected the bearer token (HTTP 401/403). Recovered per row.
    #[error("authentication error: {0}")]
    Auth(String),

    /// Any other non-2xx status or an unparseable response body. Recovered per row.
    #[error("remote service error: {0}")]
    RemoteService(String),

    /// Connection failure or timeout talking to the API. Recovered per row.
    #[error("network error: {0}")]
    Network(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, AskGleanError>;

impl AskGleanError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create an input format error from any displayable message.
    pub fn input_format(msg: impl Into<String>) -> Self {
        Self::InputFormat {
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
        let err = AskGleanError::config("GLEAN_API_TOKEN not set");
        assert_eq!(err.to_string(), "config error: GLEAN_API_TOKEN not set");

        let err = AskGleanError::input_format("header `citations` missing");
        assert!(err.to_string().contains("citations"));

        let err = AskGleanError::Auth("HTTP 401".into());
        assert_eq!(err.to_string(), "authentication error: HTTP 401");
    }
}
