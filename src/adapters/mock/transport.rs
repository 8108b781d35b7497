//! Mock transport for testing.
//!
//! [`MockSocket`] routes injected events through the same
//! [`DispatchSlot`] the real socket uses, so dispatch interceptors see
//! exactly what they would see in production.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::Value;

use crate::error::TransportError;
use crate::socketio::{DispatchSlot, HandlerRegistry, NamedDispatch};
use crate::traits::{
    ConnectOptions, DispatchWrapper, EventHandler, EventPacket, Transport, TransportHandle,
    EVENT_CONNECT, EVENT_CONNECT_ERROR, EVENT_DISCONNECT,
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Default)]
struct MockSocketState {
    connect_calls: usize,
    disconnect_calls: usize,
    connected: bool,
    id: Option<String>,
    emitted: Vec<(String, Value)>,
    emit_should_fail: bool,
}

struct MockSocketInner {
    url: String,
    options: ConnectOptions,
    registry: Arc<HandlerRegistry>,
    dispatch: DispatchSlot,
    state: Mutex<MockSocketState>,
}

/// Mock socket.
///
/// This mock allows:
/// - Simulating the connect / disconnect / connect_error lifecycle
/// - Injecting named events through the raw dispatch
/// - Capturing emitted events
///
/// # Example
///
/// ```ignore
/// let transport = MockTransport::new();
/// let socket = transport.socket("http://localhost:3000", ConnectOptions::default())?;
/// socket.connect();
/// socket.simulate_connect("abc");
/// socket.inject_event("news", vec![json!({"a": 1})]);
/// ```
#[derive(Clone)]
pub struct MockSocket {
    inner: Arc<MockSocketInner>,
}

impl MockSocket {
    pub fn new(url: &str, options: ConnectOptions) -> Self {
        let registry = Arc::new(HandlerRegistry::new());
        let dispatch = DispatchSlot::new(Arc::new(NamedDispatch::new(registry.clone())));
        Self {
            inner: Arc::new(MockSocketInner {
                url: url.to_string(),
                options,
                registry,
                dispatch,
                state: Mutex::new(MockSocketState::default()),
            }),
        }
    }

    pub fn url(&self) -> &str {
        &self.inner.url
    }

    pub fn options(&self) -> &ConnectOptions {
        &self.inner.options
    }

    /// Mark connected and fire `connect` with the socket id.
    pub fn simulate_connect(&self, sid: &str) {
        {
            let mut state = lock(&self.inner.state);
            state.connected = true;
            state.id = Some(sid.to_string());
        }
        self.inner
            .registry
            .emit(EVENT_CONNECT, &[Value::String(sid.to_string())]);
    }

    /// Mark disconnected and fire `disconnect` with the reason.
    pub fn simulate_disconnect(&self, reason: &str) {
        {
            let mut state = lock(&self.inner.state);
            state.connected = false;
            state.id = None;
        }
        self.inner
            .registry
            .emit(EVENT_DISCONNECT, &[Value::String(reason.to_string())]);
    }

    /// Fire `connect_error` with the message.
    pub fn simulate_connect_error(&self, message: &str) {
        lock(&self.inner.state).connected = false;
        self.inner
            .registry
            .emit(EVENT_CONNECT_ERROR, &[Value::String(message.to_string())]);
    }

    /// Deliver a named event the way the wire would: through the raw dispatch.
    pub fn inject_event(&self, event: &str, args: Vec<Value>) {
        self.inner.dispatch.dispatch(&EventPacket::new(event, args));
    }

    /// Configure whether emit should fail.
    pub fn set_emit_should_fail(&self, should_fail: bool) {
        lock(&self.inner.state).emit_should_fail = should_fail;
    }

    /// Every `(event, payload)` emitted so far.
    pub fn emitted(&self) -> Vec<(String, Value)> {
        lock(&self.inner.state).emitted.clone()
    }

    pub fn connect_calls(&self) -> usize {
        lock(&self.inner.state).connect_calls
    }

    pub fn was_disconnected(&self) -> bool {
        lock(&self.inner.state).disconnect_calls > 0
    }

    pub fn handler_count(&self, event: &str) -> usize {
        self.inner.registry.handler_count(event)
    }
}

impl TransportHandle for MockSocket {
    fn connect(&self) {
        lock(&self.inner.state).connect_calls += 1;
    }

    fn on(&self, event: &str, handler: EventHandler) {
        self.inner.registry.on(event, handler);
    }

    fn emit(&self, event: &str, payload: Value) -> Result<(), TransportError> {
        let mut state = lock(&self.inner.state);
        if state.emit_should_fail || !state.connected {
            return Err(TransportError::Closed);
        }
        state.emitted.push((event.to_string(), payload));
        Ok(())
    }

    fn disconnect(&self) {
        let mut state = lock(&self.inner.state);
        state.disconnect_calls += 1;
        state.connected = false;
        state.id = None;
    }

    fn intercept_dispatch(&self, wrap: DispatchWrapper) {
        self.inner.dispatch.intercept(wrap);
    }

    fn is_connected(&self) -> bool {
        lock(&self.inner.state).connected
    }

    fn id(&self) -> Option<String> {
        lock(&self.inner.state).id.clone()
    }
}

#[derive(Default)]
struct MockTransportState {
    sockets: Vec<MockSocket>,
    fail_next: Option<String>,
}

/// Mock transport that records every socket it creates.
///
/// Clones share state, so a test can keep one clone while the session owns
/// another.
#[derive(Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockTransportState>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `socket()` call fail with an invalid-URL error.
    pub fn fail_next_socket(&self, message: &str) {
        lock(&self.state).fail_next = Some(message.to_string());
    }

    pub fn sockets(&self) -> Vec<MockSocket> {
        lock(&self.state).sockets.clone()
    }

    pub fn socket_count(&self) -> usize {
        lock(&self.state).sockets.len()
    }

    /// The most recently created socket.
    pub fn last_socket(&self) -> Option<MockSocket> {
        lock(&self.state).sockets.last().cloned()
    }
}

impl Transport for MockTransport {
    type Handle = MockSocket;

    fn socket(&self, url: &str, options: ConnectOptions) -> Result<MockSocket, TransportError> {
        let mut state = lock(&self.state);
        if let Some(message) = state.fail_next.take() {
            return Err(TransportError::InvalidUrl {
                url: url.to_string(),
                message,
            });
        }
        let socket = MockSocket::new(url, options);
        state.sockets.push(socket.clone());
        Ok(socket)
    }
}
