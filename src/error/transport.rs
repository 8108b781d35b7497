//! Transport-level error types.
//!
//! These errors come out of the Socket.IO client: URL parsing, engine
//! handshakes, packet decoding and the socket task going away.

use thiserror::Error;

/// Errors raised by the Socket.IO transport.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransportError {
    /// The endpoint URL could not be parsed or uses an unsupported scheme.
    #[error("invalid endpoint '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    /// Opening an engine transport failed.
    #[error("{transport} error: {message}")]
    ConnectionFailed {
        transport: &'static str,
        message: String,
    },

    /// The peer sent something that is not valid Engine.IO / Socket.IO.
    #[error("protocol error: {message}")]
    Protocol { message: String },

    /// An HTTP request of the polling transport failed.
    #[error("xhr poll error: {message}")]
    Http { message: String },

    /// The socket task is gone; nothing can be written any more.
    #[error("socket is closed")]
    Closed,
}

impl TransportError {
    pub(crate) fn protocol(message: impl Into<String>) -> Self {
        TransportError::Protocol {
            message: message.into(),
        }
    }

    /// Get a short error code for tracing output.
    pub fn error_code(&self) -> &'static str {
        match self {
            TransportError::InvalidUrl { .. } => "E_TRANSPORT_URL",
            TransportError::ConnectionFailed { .. } => "E_TRANSPORT_CONN",
            TransportError::Protocol { .. } => "E_TRANSPORT_PROTOCOL",
            TransportError::Http { .. } => "E_TRANSPORT_HTTP",
            TransportError::Closed => "E_TRANSPORT_CLOSED",
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        TransportError::Http {
            message: err.to_string(),
        }
    }
}
