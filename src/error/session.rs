//! Session-level error taxonomy.
//!
//! Every variant is recovered at the session/controller boundary and turned
//! into a log entry; nothing here is fatal to the process.

use thiserror::Error;

use super::{CodecError, TransportError};
use crate::event_log::{LogCategory, LogEntry};

/// Failures surfaced by [`crate::session::ConnectionSession`] and
/// [`crate::session::SessionController`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    /// Handshake rejected, endpoint unreachable or URL unusable.
    #[error("Connect error: {reason}")]
    ConnectFailure { reason: String },

    /// The transport closed the connection.
    #[error("Disconnected: {reason}")]
    RemoteDisconnect { reason: String },

    /// The operator closed the connection.
    #[error("Disconnected by user")]
    LocalDisconnect,

    /// A send was attempted without a live, connected handle.
    #[error("Cannot send: Not connected")]
    NotConnected,

    /// The outbound text looked like a JSON object but did not parse.
    #[error("JSON format error: {0}")]
    InvalidJson(String),

    /// The handle refused the emit (its task already ended).
    #[error("Send failed: {0}")]
    Transport(#[from] TransportError),
}

impl SessionError {
    /// The log category this failure is recorded under.
    pub fn category(&self) -> LogCategory {
        match self {
            SessionError::RemoteDisconnect { .. } | SessionError::LocalDisconnect => {
                LogCategory::Disconnect
            }
            SessionError::ConnectFailure { .. }
            | SessionError::NotConnected
            | SessionError::InvalidJson(_)
            | SessionError::Transport(_) => LogCategory::Error,
        }
    }

    /// Get a short error code for tracing output.
    pub fn error_code(&self) -> &'static str {
        match self {
            SessionError::ConnectFailure { .. } => "E_CONNECT",
            SessionError::RemoteDisconnect { .. } => "E_REMOTE_DISCONNECT",
            SessionError::LocalDisconnect => "E_LOCAL_DISCONNECT",
            SessionError::NotConnected => "E_NOT_CONNECTED",
            SessionError::InvalidJson(_) => "E_INVALID_JSON",
            SessionError::Transport(_) => "E_SEND",
        }
    }
}

impl From<CodecError> for SessionError {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::InvalidJson(message) => SessionError::InvalidJson(message),
        }
    }
}

impl From<&SessionError> for LogEntry {
    fn from(err: &SessionError) -> Self {
        LogEntry::new(err.category(), err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_text_matches_operator_messages() {
        assert_eq!(
            SessionError::NotConnected.to_string(),
            "Cannot send: Not connected"
        );
        assert_eq!(
            SessionError::LocalDisconnect.to_string(),
            "Disconnected by user"
        );
        assert_eq!(
            SessionError::RemoteDisconnect {
                reason: "io server disconnect".to_string()
            }
            .to_string(),
            "Disconnected: io server disconnect"
        );
        assert_eq!(
            SessionError::ConnectFailure {
                reason: "websocket error".to_string()
            }
            .to_string(),
            "Connect error: websocket error"
        );
    }

    #[test]
    fn test_local_and_remote_disconnect_are_distinguishable() {
        let local = LogEntry::from(&SessionError::LocalDisconnect);
        let remote = LogEntry::from(&SessionError::RemoteDisconnect {
            reason: "transport close".to_string(),
        });

        assert_eq!(local.category(), LogCategory::Disconnect);
        assert_eq!(remote.category(), LogCategory::Disconnect);
        assert_ne!(local.text(), remote.text());
    }

    #[test]
    fn test_codec_error_maps_to_invalid_json() {
        let err: SessionError = CodecError::InvalidJson("EOF".to_string()).into();
        assert!(matches!(err, SessionError::InvalidJson(_)));
        assert_eq!(err.category(), LogCategory::Error);
    }

    #[test]
    fn test_transport_error_is_logged_as_error() {
        let err: SessionError = TransportError::Closed.into();
        assert_eq!(err.category(), LogCategory::Error);
        assert_eq!(err.to_string(), "Send failed: socket is closed");
    }
}
