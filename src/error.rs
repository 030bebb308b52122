//! Error types module
//!
//! The server's error taxonomy. Most failures are handled where they
//! occur and turn into a response; the variants here are the ones that
//! cross module boundaries.

use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    /// Startup-time configuration problems: unreadable templates,
    /// unusable TLS credentials
    #[error("invalid config: {0}")]
    Config(String),

    /// A requested resource does not exist; the message is surfaced in
    /// the response body
    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Io(#[from] io::Error),

    /// The external music service failed or returned an unusable payload
    #[error(transparent)]
    Upstream(#[from] reqwest::Error),

    /// The request is deliberately left unanswered; the connection layer
    /// closes the socket without writing a response
    #[error("request ignored: {0}")]
    Ignored(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_errors_convert() {
        let err: ServerError = io::Error::new(io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(err, ServerError::Io(_)));
        assert_eq!(err.to_string(), "gone");
    }

    #[test]
    fn test_config_error_display() {
        let err = ServerError::Config("cannot read 'x'".to_string());
        assert_eq!(err.to_string(), "invalid config: cannot read 'x'");
    }
}
