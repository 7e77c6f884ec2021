//! Error types for Gateway Report.
//!
//! Library crates use [`GatewayReportError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all Gateway Report operations.
#[derive(Debug, thiserror::Error)]
pub enum GatewayReportError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Analytics or category endpoint failure: transport, HTTP status,
    /// malformed body, or an API-reported error.
    #[error("api error: {0}")]
    Api(String),

    /// The email could not be built or the dispatch capability rejected it.
    #[error("send error: {0}")]
    Send(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, GatewayReportError>;

impl GatewayReportError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create an API error from any displayable message.
    pub fn api(msg: impl Into<String>) -> Self {
        Self::Api(msg.into())
    }

    /// Create a send error from any displayable message.
    pub fn send(msg: impl Into<String>) -> Self {
        Self::Send(msg.into())
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Short machine-friendly label used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Config { .. } => "config",
            Self::Api(_) => "api",
            Self::Send(_) => "send",
            Self::Io { .. } => "io",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = GatewayReportError::config("API token is empty");
        assert_eq!(err.to_string(), "config error: API token is empty");

        let err = GatewayReportError::api("graphql: HTTP 500 Internal Server Error");
        assert!(err.to_string().starts_with("api error: "));
        assert!(err.to_string().contains("HTTP 500"));
    }

    #[test]
    fn error_kinds() {
        assert_eq!(GatewayReportError::api("x").kind(), "api");
        assert_eq!(GatewayReportError::send("x").kind(), "send");
        assert_eq!(GatewayReportError::config("x").kind(), "config");
        let io = GatewayReportError::io(
            "/tmp/missing",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert_eq!(io.kind(), "io");
        assert!(io.to_string().contains("/tmp/missing"));
    }
}
