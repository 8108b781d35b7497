//! The single live connection and its lifecycle.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::intercept::ObservingDispatch;
use super::{SessionEvent, SessionEventKind};
use crate::codec::{describe, describe_args, Payload};
use crate::config::TransportKind;
use crate::error::SessionError;
use crate::event_log::{LogCategory, LogEntry};
use crate::traits::{
    ConnectOptions, EventHandler, Transport, TransportHandle, EVENT_CONNECT, EVENT_CONNECT_ERROR,
    EVENT_DISCONNECT, EVENT_MESSAGE,
};

/// Lifecycle of the session's current handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Connecting,
    Connected,
    Disconnected,
    Errored,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Connecting => "connecting",
            SessionState::Connected => "connected",
            SessionState::Disconnected => "disconnected",
            SessionState::Errored => "error",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// First string argument of a lifecycle callback, or a placeholder.
fn first_text(args: &[Value]) -> String {
    match args.first() {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Object(map)) => map
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| describe_args(args)),
        Some(other) => other.to_string(),
        None => "unknown".to_string(),
    }
}

/// Owns at most one transport handle at a time.
///
/// Every handle is tagged with a generation. Callbacks forward
/// [`SessionEvent`]s carrying that generation; [`ConnectionSession::apply`]
/// drops any whose generation is not the current one.
pub struct ConnectionSession<T: Transport> {
    transport: T,
    transports: Vec<TransportKind>,
    events: mpsc::UnboundedSender<SessionEvent>,
    endpoint_url: String,
    credential: String,
    handle: Option<T::Handle>,
    generation: u64,
    state: SessionState,
}

impl<T: Transport> ConnectionSession<T> {
    pub fn new(
        transport: T,
        transports: Vec<TransportKind>,
        events: mpsc::UnboundedSender<SessionEvent>,
    ) -> Self {
        Self {
            transport,
            transports,
            events,
            endpoint_url: String::new(),
            credential: String::new(),
            handle: None,
            generation: 0,
            state: SessionState::Idle,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn endpoint_url(&self) -> &str {
        &self.endpoint_url
    }

    pub fn credential(&self) -> &str {
        &self.credential
    }

    pub fn has_handle(&self) -> bool {
        self.handle.is_some()
    }

    /// Socket id of the current handle, once connected.
    pub fn socket_id(&self) -> Option<String> {
        self.handle.as_ref().and_then(|h| h.id())
    }

    /// Replace any existing handle with a new one and start its handshake.
    ///
    /// The previous handle, if any, is disconnected and its generation
    /// retired before the new handle is created. Lifecycle observers and the
    /// raw-dispatch interception are installed before `connect()` is called
    /// on the handle, so no early event is missed.
    ///
    /// Returns once the handshake is under way; the outcome arrives later as
    /// a [`SessionEvent`].
    ///
    /// # Arguments
    ///
    /// * `endpoint_url` - Socket.IO URL, namespace in the path
    /// * `credential` - Sent as `{"token": credential}`, even when empty
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::ConnectFailure`] when the transport cannot
    /// build a handle for the URL. The state is then `Errored`.
    pub fn connect(&mut self, endpoint_url: &str, credential: &str) -> Result<(), SessionError> {
        self.teardown();
        self.generation += 1;
        self.endpoint_url = endpoint_url.to_string();
        self.credential = credential.to_string();

        let options = ConnectOptions::new(self.transports.clone()).with_token(credential);
        let handle = match self.transport.socket(endpoint_url, options) {
            Ok(handle) => handle,
            Err(e) => {
                warn!("Cannot create socket for {}: {}", endpoint_url, e);
                self.state = SessionState::Errored;
                return Err(SessionError::ConnectFailure {
                    reason: e.to_string(),
                });
            }
        };

        self.install_observers(&handle);
        handle.connect();
        self.handle = Some(handle);
        self.state = SessionState::Connecting;
        info!(
            "Connecting to {} (generation {})",
            endpoint_url, self.generation
        );
        Ok(())
    }

    fn install_observers(&self, handle: &T::Handle) {
        let generation = self.generation;

        let forward = |map: fn(&[Value]) -> SessionEventKind| -> EventHandler {
            let events = self.events.clone();
            Arc::new(move |args: &[Value]| {
                let _ = events.send(SessionEvent::new(generation, map(args)));
            })
        };

        handle.on(
            EVENT_CONNECT,
            forward(|args| SessionEventKind::Connected {
                sid: first_text(args),
            }),
        );
        handle.on(
            EVENT_DISCONNECT,
            forward(|args| SessionEventKind::Disconnected {
                reason: first_text(args),
            }),
        );
        handle.on(
            EVENT_CONNECT_ERROR,
            forward(|args| SessionEventKind::ConnectError {
                message: first_text(args),
            }),
        );
        handle.on(
            EVENT_MESSAGE,
            forward(|args| SessionEventKind::Inbound {
                event: EVENT_MESSAGE.to_string(),
                args: args.to_vec(),
            }),
        );

        handle.intercept_dispatch(ObservingDispatch::wrapper(generation, self.events.clone()));
    }

    /// Close the current handle at the operator's request.
    ///
    /// Returns `None` when there is nothing to disconnect.
    pub fn disconnect(&mut self) -> Option<LogEntry> {
        let handle = self.handle.take()?;
        handle.disconnect();
        // The handle's own disconnect callback belongs to a dead generation now.
        self.generation += 1;
        self.state = SessionState::Disconnected;
        info!("Disconnected by operator");
        Some(LogEntry::from(&SessionError::LocalDisconnect))
    }

    /// Fail unless the current handle has completed its handshake.
    pub fn ensure_connected(&self) -> Result<&T::Handle, SessionError> {
        match &self.handle {
            Some(handle) if self.state == SessionState::Connected => Ok(handle),
            _ => Err(SessionError::NotConnected),
        }
    }

    /// Emit `payload` under `event_name` on the current handle.
    ///
    /// # Returns
    ///
    /// The `Outbound` entry describing what was sent.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotConnected`] unless the handshake has
    /// completed, or a transport error if the handle refuses the emit.
    pub fn send(&self, event_name: &str, payload: &Payload) -> Result<LogEntry, SessionError> {
        let handle = self.ensure_connected()?;
        handle.emit(event_name, payload.to_value())?;
        debug!("Emitted '{}'", event_name);
        Ok(LogEntry::new(
            LogCategory::Outbound,
            format!("Sent '{}': {}", event_name, describe(payload)),
        ))
    }

    /// Fold a transport report into the session.
    ///
    /// Reports tagged with a generation other than the current one are
    /// dropped, as are reports arriving after a local disconnect. Everything
    /// else updates the state and becomes exactly one log entry.
    ///
    /// # Returns
    ///
    /// The entry to log, or `None` for reports from a superseded handle.
    pub fn apply(&mut self, event: SessionEvent) -> Option<LogEntry> {
        if event.generation != self.generation || self.handle.is_none() {
            debug!(
                "Dropping stale event from generation {} (current {})",
                event.generation, self.generation
            );
            return None;
        }

        let entry = match event.kind {
            SessionEventKind::Connected { sid } => {
                self.state = SessionState::Connected;
                LogEntry::new(LogCategory::Connect, format!("Connected: {}", sid))
            }
            SessionEventKind::Disconnected { reason } => {
                self.state = SessionState::Disconnected;
                LogEntry::from(&SessionError::RemoteDisconnect { reason })
            }
            SessionEventKind::ConnectError { message } => {
                self.state = SessionState::Errored;
                LogEntry::from(&SessionError::ConnectFailure { reason: message })
            }
            SessionEventKind::Inbound { event, args } => LogEntry::new(
                LogCategory::Inbound,
                format!("Received '{}': {}", event, describe_args(&args)),
            ),
        };
        Some(entry)
    }

    fn teardown(&mut self) {
        if let Some(handle) = self.handle.take() {
            debug!("Tearing down generation {}", self.generation);
            handle.disconnect();
        }
    }
}

impl<T: Transport> Drop for ConnectionSession<T> {
    fn drop(&mut self) {
        self.teardown();
    }
}
