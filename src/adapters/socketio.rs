//! Socket.IO transport adapter.
//!
//! Wraps [`crate::socketio::Socket`] behind the [`Transport`] factory trait so
//! the session can be driven by the real client or by
//! [`crate::adapters::mock::MockTransport`].

use crate::error::TransportError;
use crate::socketio::{Endpoint, Socket};
use crate::traits::{ConnectOptions, Transport};

/// Production transport: a Socket.IO client over websocket or long-polling.
///
/// # Example
///
/// ```ignore
/// use sioprobe::adapters::SocketIoTransport;
/// use sioprobe::traits::{ConnectOptions, Transport, TransportHandle};
///
/// let transport = SocketIoTransport::new();
/// let socket = transport.socket("http://localhost:3000", ConnectOptions::default())?;
/// socket.on("connect", std::sync::Arc::new(|args| println!("{:?}", args)));
/// socket.connect();
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct SocketIoTransport;

impl SocketIoTransport {
    /// Create the transport. It holds no state; every socket is independent.
    pub fn new() -> Self {
        Self
    }
}

impl Transport for SocketIoTransport {
    type Handle = Socket;

    /// Parse `url` into an [`Endpoint`] and build an idle [`Socket`] for it.
    ///
    /// # Arguments
    ///
    /// * `url` - Socket.IO URL; its path selects the namespace
    /// * `options` - Auth payload and transport order for the handshake
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::InvalidUrl`] when the URL cannot be parsed or
    /// uses a scheme other than http, https, ws or wss.
    fn socket(&self, url: &str, options: ConnectOptions) -> Result<Socket, TransportError> {
        let endpoint = Endpoint::parse(url)?;
        tracing::debug!(
            "Creating socket for {} (namespace {})",
            endpoint.as_str(),
            endpoint.namespace()
        );
        Ok(Socket::new(endpoint, options))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::TransportHandle;

    #[test]
    fn test_socket_is_created_idle() {
        let socket = SocketIoTransport::new()
            .socket("http://localhost:3000/admin", ConnectOptions::default())
            .unwrap();
        assert!(!socket.is_connected());
        assert_eq!(socket.endpoint().namespace(), "/admin");
    }

    #[test]
    fn test_invalid_url_is_rejected() {
        let result = SocketIoTransport::new().socket("ftp://nope", ConnectOptions::default());
        assert!(matches!(result, Err(TransportError::InvalidUrl { .. })));
    }
}
