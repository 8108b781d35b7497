//! Real-time transport trait abstraction.
//!
//! The session only talks to the transport through these traits, which
//! lets tests drive it with [`crate::adapters::mock::MockTransport`] instead
//! of a live server.

use std::sync::Arc;

use serde_json::{json, Value};

use crate::config::{default_transports, TransportKind};
use crate::error::TransportError;

/// Reserved lifecycle event: the namespace handshake succeeded. Args: `[socket id]`.
pub const EVENT_CONNECT: &str = "connect";
/// Reserved lifecycle event: the connection closed. Args: `[reason]`.
pub const EVENT_DISCONNECT: &str = "disconnect";
/// Reserved lifecycle event: the connection could not be established. Args: `[message]`.
pub const EVENT_CONNECT_ERROR: &str = "connect_error";
/// The conventional application-level event name.
pub const EVENT_MESSAGE: &str = "message";

/// Callback bound to a single event name.
pub type EventHandler = Arc<dyn Fn(&[Value]) + Send + Sync>;

/// Replaces the current raw dispatch with a wrapper around it.
pub type DispatchWrapper =
    Box<dyn FnOnce(Arc<dyn PacketDispatch>) -> Arc<dyn PacketDispatch> + Send>;

/// A named event as it arrives from the peer, before per-name routing.
#[derive(Debug, Clone, PartialEq)]
pub struct EventPacket {
    pub namespace: String,
    pub event: String,
    pub args: Vec<Value>,
    /// Acknowledgement id requested by the peer, if any.
    pub ack_id: Option<u64>,
}

impl EventPacket {
    pub fn new(event: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            namespace: "/".to_string(),
            event: event.into(),
            args,
            ack_id: None,
        }
    }
}

/// The transport's single entry point for every incoming named event.
pub trait PacketDispatch: Send + Sync {
    fn dispatch(&self, packet: &EventPacket);
}

/// Options passed when a socket is created.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectOptions {
    /// Sent with the namespace CONNECT packet.
    pub auth: Option<Value>,
    /// Transports to try, in order.
    pub transports: Vec<TransportKind>,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self {
            auth: None,
            transports: default_transports(),
        }
    }
}

impl ConnectOptions {
    pub fn new(transports: Vec<TransportKind>) -> Self {
        Self {
            auth: None,
            transports,
        }
    }

    /// Attach `{"token": token}` as the auth payload.
    pub fn with_token(mut self, token: &str) -> Self {
        self.auth = Some(json!({ "token": token }));
        self
    }
}

/// A single connection to a remote endpoint.
///
/// Handles are created idle by [`Transport::socket`]; nothing goes over the
/// wire until [`TransportHandle::connect`] is called, so observers can be
/// installed first.
pub trait TransportHandle: Send + Sync {
    /// Start the handshake. Returns immediately.
    fn connect(&self);

    /// Bind a handler to an exact event name (reserved lifecycle names included).
    fn on(&self, event: &str, handler: EventHandler);

    /// Queue an event for the peer.
    fn emit(&self, event: &str, payload: Value) -> Result<(), TransportError>;

    /// Close the connection immediately.
    fn disconnect(&self);

    /// Wrap the raw dispatch that every incoming named event goes through.
    fn intercept_dispatch(&self, wrap: DispatchWrapper);

    fn is_connected(&self) -> bool;

    /// Socket id assigned by the server once connected.
    fn id(&self) -> Option<String>;
}

/// Factory for transport handles.
pub trait Transport: Send + Sync {
    type Handle: TransportHandle + 'static;

    /// Create an idle handle for `url`. Fails only on an unusable URL.
    fn socket(&self, url: &str, options: ConnectOptions) -> Result<Self::Handle, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_options_with_token() {
        let options = ConnectOptions::new(vec![TransportKind::Polling]).with_token("abc");
        assert_eq!(options.auth, Some(json!({"token": "abc"})));
        assert_eq!(options.transports, vec![TransportKind::Polling]);
    }

    #[test]
    fn test_empty_token_still_sends_auth() {
        let options = ConnectOptions::default().with_token("");
        assert_eq!(options.auth, Some(json!({"token": ""})));
    }

    #[test]
    fn test_event_packet_defaults_to_root_namespace() {
        let packet = EventPacket::new("news", vec![json!(1)]);
        assert_eq!(packet.namespace, "/");
        assert_eq!(packet.ack_id, None);
    }
}
