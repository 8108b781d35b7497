//! Connection session and the controller the UI talks to.
//!
//! Transport callbacks never touch session state directly. They forward
//! [`SessionEvent`]s, tagged with the generation of the handle that raised
//! them, over a channel; the UI task feeds those back into
//! [`SessionController::handle_event`], where stale generations are dropped.

pub mod connection;
pub mod controller;
pub mod intercept;

pub use connection::{ConnectionSession, SessionState};
pub use controller::{OutboundIntent, SessionController};
pub use intercept::ObservingDispatch;

use serde_json::Value;

/// Something a transport handle reported.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEventKind {
    /// Namespace joined; carries the socket id.
    Connected { sid: String },
    /// Connection closed; carries the transport-supplied reason.
    Disconnected { reason: String },
    /// Connection could not be established.
    ConnectError { message: String },
    /// A named event arrived.
    Inbound { event: String, args: Vec<Value> },
}

/// A [`SessionEventKind`] tagged with the generation of its handle.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionEvent {
    pub generation: u64,
    pub kind: SessionEventKind,
}

impl SessionEvent {
    pub fn new(generation: u64, kind: SessionEventKind) -> Self {
        Self { generation, kind }
    }
}
