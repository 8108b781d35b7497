//! Socket.IO client socket.
//!
//! A [`Socket`] is created idle. [`TransportHandle::connect`] spawns the
//! connection task, which opens an Engine.IO transport, joins the namespace
//! and then pumps packets until the connection ends. Every EVENT packet goes
//! through the [`DispatchSlot`]; lifecycle notifications go straight to the
//! named handlers.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde_json::Value;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::dispatch::{DispatchSlot, HandlerRegistry, NamedDispatch};
use super::endpoint::Endpoint;
use super::engine::{self, EngineEvent, REASON_TRANSPORT_CLOSE, REASON_TRANSPORT_ERROR};
use super::packet::{BinaryAssembler, EnginePacket, SocketPacket, SocketPacketKind};
use crate::error::TransportError;
use crate::traits::{
    ConnectOptions, DispatchWrapper, EventHandler, TransportHandle, EVENT_CONNECT,
    EVENT_CONNECT_ERROR, EVENT_DISCONNECT,
};

/// The server closed the namespace.
pub const REASON_IO_SERVER_DISCONNECT: &str = "io server disconnect";
/// [`TransportHandle::disconnect`] was called.
pub const REASON_IO_CLIENT_DISCONNECT: &str = "io client disconnect";
/// No ping arrived within `pingInterval + pingTimeout`.
pub const REASON_PING_TIMEOUT: &str = "ping timeout";

enum Command {
    Emit(SocketPacket),
    Disconnect,
}

/// How the connection task ended.
enum Exit {
    /// The server refused the namespace CONNECT.
    Refused(String),
    /// The connection closed for the given reason.
    Closed(String),
}

#[derive(Default)]
struct Status {
    started: bool,
    /// Reported by `is_connected()`; cleared as soon as the caller disconnects.
    connected: bool,
    /// The namespace was joined. Only the connection task clears it.
    joined: bool,
    id: Option<String>,
    commands: Option<mpsc::UnboundedSender<Command>>,
    task: Option<JoinHandle<()>>,
}

struct Shared {
    endpoint: Endpoint,
    options: ConnectOptions,
    registry: Arc<HandlerRegistry>,
    dispatch: DispatchSlot,
    status: Mutex<Status>,
}

impl Shared {
    fn status(&self) -> MutexGuard<'_, Status> {
        self.status.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn deliver(&self, packet: SocketPacket) {
        match packet.into_event() {
            Some(event) => {
                if event.ack_id.is_some() {
                    debug!("'{}' requested an ack; acks are not sent", event.event);
                }
                self.dispatch.dispatch(&event);
            }
            None => warn!("Ignoring event packet without an event name"),
        }
    }

    /// Handle one Socket.IO packet. Returns `Some` when the connection must end.
    fn handle_packet(
        &self,
        packet: SocketPacket,
        engine_sid: &str,
        assembler: &mut BinaryAssembler,
    ) -> Option<Exit> {
        if packet.namespace != self.endpoint.namespace() {
            debug!("Ignoring packet for namespace {}", packet.namespace);
            return None;
        }

        match packet.kind {
            SocketPacketKind::Connect => {
                let sid = packet
                    .data
                    .as_ref()
                    .and_then(|d| d.get("sid"))
                    .and_then(Value::as_str)
                    .unwrap_or(engine_sid)
                    .to_string();
                {
                    let mut status = self.status();
                    status.connected = true;
                    status.joined = true;
                    status.id = Some(sid.clone());
                }
                info!("Connected to namespace {} as {}", packet.namespace, sid);
                self.registry.emit(EVENT_CONNECT, &[Value::String(sid)]);
                None
            }
            SocketPacketKind::ConnectError => Some(Exit::Refused(packet.error_message())),
            SocketPacketKind::Disconnect => {
                Some(Exit::Closed(REASON_IO_SERVER_DISCONNECT.to_string()))
            }
            SocketPacketKind::Event => {
                self.deliver(packet);
                None
            }
            SocketPacketKind::BinaryEvent => {
                if packet.attachments == 0 {
                    self.deliver(packet);
                } else {
                    assembler.start(packet);
                }
                None
            }
            SocketPacketKind::Ack | SocketPacketKind::BinaryAck => {
                debug!("Ignoring ack packet {:?}", packet.id);
                None
            }
        }
    }

    fn finish(&self, exit: Exit) {
        let was_joined = {
            let mut status = self.status();
            let was_joined = status.joined;
            status.connected = false;
            status.joined = false;
            status.id = None;
            status.commands = None;
            was_joined
        };

        match exit {
            Exit::Refused(message) => {
                warn!("Connection refused: {}", message);
                self.registry
                    .emit(EVENT_CONNECT_ERROR, &[Value::String(message)]);
            }
            Exit::Closed(reason) if was_joined => {
                info!("Disconnected: {}", reason);
                self.registry.emit(EVENT_DISCONNECT, &[Value::String(reason)]);
            }
            Exit::Closed(reason) => {
                warn!("Closed before the namespace was joined: {}", reason);
                self.registry
                    .emit(EVENT_CONNECT_ERROR, &[Value::String(reason)]);
            }
        }
    }
}

/// A Socket.IO connection to one namespace.
#[derive(Clone)]
pub struct Socket {
    shared: Arc<Shared>,
}

impl Socket {
    /// Create an idle socket; nothing is sent until `connect()`.
    ///
    /// # Arguments
    ///
    /// * `endpoint` - Where to connect; its namespace is the one joined
    /// * `options` - Auth payload for the namespace CONNECT and the
    ///   transport order to try
    pub fn new(endpoint: Endpoint, options: ConnectOptions) -> Self {
        let registry = Arc::new(HandlerRegistry::new());
        let dispatch = DispatchSlot::new(Arc::new(NamedDispatch::new(registry.clone())));
        Self {
            shared: Arc::new(Shared {
                endpoint,
                options,
                registry,
                dispatch,
                status: Mutex::new(Status::default()),
            }),
        }
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.shared.endpoint
    }

    pub fn options(&self) -> &ConnectOptions {
        &self.shared.options
    }
}

impl TransportHandle for Socket {
    fn connect(&self) {
        let mut status = self.shared.status();
        if status.started {
            debug!("Socket already started");
            return;
        }
        let (tx, rx) = mpsc::unbounded_channel();
        status.started = true;
        status.commands = Some(tx);
        status.task = Some(tokio::spawn(run(self.shared.clone(), rx)));
    }

    fn on(&self, event: &str, handler: EventHandler) {
        self.shared.registry.on(event, handler);
    }

    fn emit(&self, event: &str, payload: Value) -> Result<(), TransportError> {
        let packet = SocketPacket::event(self.shared.endpoint.namespace(), event, payload);
        let status = self.shared.status();
        let commands = status.commands.as_ref().ok_or(TransportError::Closed)?;
        commands
            .send(Command::Emit(packet))
            .map_err(|_| TransportError::Closed)
    }

    /// Leave the namespace, or abandon a handshake still in progress.
    ///
    /// A joined socket sends a namespace DISCONNECT and later fires
    /// `disconnect` with `io client disconnect`. An abandoned handshake fires
    /// nothing. `is_connected()` is false as soon as this returns.
    fn disconnect(&self) {
        let mut status = self.shared.status();
        let Some(commands) = status.commands.take() else {
            return;
        };
        if status.connected {
            let _ = commands.send(Command::Disconnect);
        } else if let Some(task) = status.task.take() {
            // Still handshaking: drop the attempt outright.
            task.abort();
        }
        status.connected = false;
        status.id = None;
    }

    fn intercept_dispatch(&self, wrap: DispatchWrapper) {
        self.shared.dispatch.intercept(wrap);
    }

    fn is_connected(&self) -> bool {
        self.shared.status().connected
    }

    fn id(&self) -> Option<String> {
        self.shared.status().id.clone()
    }
}

/// The connection task.
async fn run(shared: Arc<Shared>, mut commands: mpsc::UnboundedReceiver<Command>) {
    let namespace = shared.endpoint.namespace().to_string();

    let mut conn = match engine::open(&shared.endpoint, &shared.options.transports).await {
        Ok(conn) => conn,
        Err(e) => {
            shared.finish(Exit::Refused(e.to_string()));
            return;
        }
    };

    let join = SocketPacket::connect(&namespace, shared.options.auth.clone());
    if let Err(e) = conn.send(vec![EnginePacket::Message(join.encode())]).await {
        conn.close().await;
        shared.finish(Exit::Refused(e.to_string()));
        return;
    }

    let handshake = conn.handshake().clone();
    let heartbeat = Duration::from_millis(handshake.ping_interval + handshake.ping_timeout);
    let mut deadline = Instant::now() + heartbeat;
    let mut assembler = BinaryAssembler::default();

    let exit = loop {
        tokio::select! {
            _ = tokio::time::sleep_until(deadline) => {
                break Exit::Closed(REASON_PING_TIMEOUT.to_string());
            }

            event = conn.recv() => {
                let packet = match event {
                    Some(EngineEvent::Packet(packet)) => packet,
                    Some(EngineEvent::Closed(reason)) => break Exit::Closed(reason),
                    None => break Exit::Closed(REASON_TRANSPORT_CLOSE.to_string()),
                };

                match packet {
                    EnginePacket::Ping(data) => {
                        deadline = Instant::now() + heartbeat;
                        if let Err(e) = conn.send(vec![EnginePacket::Pong(data)]).await {
                            warn!("Failed to answer ping: {}", e);
                            break Exit::Closed(REASON_TRANSPORT_ERROR.to_string());
                        }
                    }
                    EnginePacket::Close => break Exit::Closed(REASON_TRANSPORT_CLOSE.to_string()),
                    EnginePacket::Message(text) => match SocketPacket::decode(&text) {
                        Ok(packet) => {
                            if let Some(exit) = shared.handle_packet(packet, &handshake.sid, &mut assembler) {
                                break exit;
                            }
                        }
                        Err(e) => warn!("Dropping malformed socket packet: {} - {}", e, text),
                    },
                    EnginePacket::Binary(bytes) => {
                        if !assembler.is_waiting() {
                            debug!("Ignoring binary frame with no pending packet");
                        } else if let Some(complete) = assembler.push(bytes) {
                            shared.deliver(complete);
                        }
                    }
                    EnginePacket::Open(_) | EnginePacket::Pong(_) | EnginePacket::Upgrade | EnginePacket::Noop => {}
                }
            }

            command = commands.recv() => match command {
                Some(Command::Emit(packet)) => {
                    if let Err(e) = conn.send(vec![EnginePacket::Message(packet.encode())]).await {
                        warn!("Failed to emit packet: {}", e);
                    }
                }
                Some(Command::Disconnect) | None => {
                    let leave = SocketPacket::disconnect(&namespace);
                    if let Err(e) = conn.send(vec![EnginePacket::Message(leave.encode())]).await {
                        debug!("Failed to send disconnect packet: {}", e);
                    }
                    break Exit::Closed(REASON_IO_CLIENT_DISCONNECT.to_string());
                }
            }
        }
    };

    conn.close().await;
    shared.finish(exit);
}
