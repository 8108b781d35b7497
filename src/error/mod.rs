//! Error types for sioprobe.
//!
//! - [`TransportError`]: failures inside the Socket.IO client
//! - [`CodecError`]: operator text that could not be turned into a payload
//! - [`SessionError`]: the session taxonomy; every variant becomes a log entry

mod session;
mod transport;

pub use session::SessionError;
pub use transport::TransportError;

use thiserror::Error;

/// Errors raised while encoding operator input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CodecError {
    /// Text started with `{` but is not valid JSON.
    #[error("{0}")]
    InvalidJson(String),
}

impl From<serde_json::Error> for CodecError {
    fn from(err: serde_json::Error) -> Self {
        CodecError::InvalidJson(err.to_string())
    }
}
