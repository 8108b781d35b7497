//! Engine.IO v4 and Socket.IO v5 packet encoding.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::TransportError;
use crate::traits::EventPacket;

/// Separator between packets in a polling payload.
pub const RECORD_SEPARATOR: char = '\x1e';

/// Parameters the server sends in the Engine.IO open packet.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Handshake {
    pub sid: String,
    #[serde(default)]
    pub upgrades: Vec<String>,
    pub ping_interval: u64,
    pub ping_timeout: u64,
    #[serde(default)]
    pub max_payload: Option<u64>,
}

/// An Engine.IO packet.
#[derive(Debug, Clone, PartialEq)]
pub enum EnginePacket {
    Open(Handshake),
    Close,
    Ping(Option<String>),
    Pong(Option<String>),
    Message(String),
    Binary(Vec<u8>),
    Upgrade,
    Noop,
}

impl EnginePacket {
    /// Decode a text frame (websocket) or one record of a polling payload.
    pub fn decode(text: &str) -> Result<Self, TransportError> {
        let mut chars = text.chars();
        let kind = chars
            .next()
            .ok_or_else(|| TransportError::protocol("empty engine packet"))?;
        let data = chars.as_str();
        let optional = || {
            if data.is_empty() {
                None
            } else {
                Some(data.to_string())
            }
        };

        match kind {
            '0' => serde_json::from_str(data)
                .map(EnginePacket::Open)
                .map_err(|e| TransportError::protocol(format!("bad handshake: {}", e))),
            '1' => Ok(EnginePacket::Close),
            '2' => Ok(EnginePacket::Ping(optional())),
            '3' => Ok(EnginePacket::Pong(optional())),
            '4' => Ok(EnginePacket::Message(data.to_string())),
            '5' => Ok(EnginePacket::Upgrade),
            '6' => Ok(EnginePacket::Noop),
            'b' => BASE64
                .decode(data)
                .map(EnginePacket::Binary)
                .map_err(|e| TransportError::protocol(format!("bad base64 payload: {}", e))),
            other => Err(TransportError::protocol(format!(
                "unknown engine packet type '{}'",
                other
            ))),
        }
    }

    /// Encode as text. Binary packets use the polling `b` + base64 form.
    pub fn encode(&self) -> String {
        match self {
            EnginePacket::Open(hs) => format!(
                "0{}",
                json!({
                    "sid": hs.sid,
                    "upgrades": hs.upgrades,
                    "pingInterval": hs.ping_interval,
                    "pingTimeout": hs.ping_timeout,
                })
            ),
            EnginePacket::Close => "1".to_string(),
            EnginePacket::Ping(data) => format!("2{}", data.as_deref().unwrap_or("")),
            EnginePacket::Pong(data) => format!("3{}", data.as_deref().unwrap_or("")),
            EnginePacket::Message(data) => format!("4{}", data),
            EnginePacket::Binary(bytes) => format!("b{}", BASE64.encode(bytes)),
            EnginePacket::Upgrade => "5".to_string(),
            EnginePacket::Noop => "6".to_string(),
        }
    }
}

/// Split a polling response body into packets.
pub fn decode_payload(body: &str) -> Result<Vec<EnginePacket>, TransportError> {
    body.split(RECORD_SEPARATOR)
        .filter(|record| !record.is_empty())
        .map(EnginePacket::decode)
        .collect()
}

/// Join packets into a polling request body.
pub fn encode_payload(packets: &[EnginePacket]) -> String {
    packets
        .iter()
        .map(EnginePacket::encode)
        .collect::<Vec<_>>()
        .join(&RECORD_SEPARATOR.to_string())
}

/// Socket.IO packet types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocketPacketKind {
    Connect,
    Disconnect,
    Event,
    Ack,
    ConnectError,
    BinaryEvent,
    BinaryAck,
}

impl SocketPacketKind {
    fn from_char(c: char) -> Option<Self> {
        match c {
            '0' => Some(SocketPacketKind::Connect),
            '1' => Some(SocketPacketKind::Disconnect),
            '2' => Some(SocketPacketKind::Event),
            '3' => Some(SocketPacketKind::Ack),
            '4' => Some(SocketPacketKind::ConnectError),
            '5' => Some(SocketPacketKind::BinaryEvent),
            '6' => Some(SocketPacketKind::BinaryAck),
            _ => None,
        }
    }

    fn as_char(&self) -> char {
        match self {
            SocketPacketKind::Connect => '0',
            SocketPacketKind::Disconnect => '1',
            SocketPacketKind::Event => '2',
            SocketPacketKind::Ack => '3',
            SocketPacketKind::ConnectError => '4',
            SocketPacketKind::BinaryEvent => '5',
            SocketPacketKind::BinaryAck => '6',
        }
    }

    fn is_binary(&self) -> bool {
        matches!(
            self,
            SocketPacketKind::BinaryEvent | SocketPacketKind::BinaryAck
        )
    }
}

/// A Socket.IO packet carried inside an Engine.IO message.
#[derive(Debug, Clone, PartialEq)]
pub struct SocketPacket {
    pub kind: SocketPacketKind,
    pub namespace: String,
    pub data: Option<Value>,
    pub id: Option<u64>,
    /// Number of binary attachments that follow (binary kinds only).
    pub attachments: usize,
}

impl SocketPacket {
    fn new(kind: SocketPacketKind, namespace: &str, data: Option<Value>) -> Self {
        Self {
            kind,
            namespace: namespace.to_string(),
            data,
            id: None,
            attachments: 0,
        }
    }

    pub fn connect(namespace: &str, auth: Option<Value>) -> Self {
        Self::new(SocketPacketKind::Connect, namespace, auth)
    }

    pub fn disconnect(namespace: &str) -> Self {
        Self::new(SocketPacketKind::Disconnect, namespace, None)
    }

    pub fn event(namespace: &str, event: &str, payload: Value) -> Self {
        Self::new(
            SocketPacketKind::Event,
            namespace,
            Some(Value::Array(vec![Value::String(event.to_string()), payload])),
        )
    }

    /// Decode the text that follows the Engine.IO `4` message prefix.
    pub fn decode(text: &str) -> Result<Self, TransportError> {
        let mut rest = text;
        let kind_char = rest
            .chars()
            .next()
            .ok_or_else(|| TransportError::protocol("empty socket packet"))?;
        let kind = SocketPacketKind::from_char(kind_char).ok_or_else(|| {
            TransportError::protocol(format!("unknown socket packet type '{}'", kind_char))
        })?;
        rest = &rest[kind_char.len_utf8()..];

        let mut attachments = 0;
        if kind.is_binary() {
            let dash = rest
                .find('-')
                .ok_or_else(|| TransportError::protocol("binary packet without attachment count"))?;
            attachments = rest[..dash]
                .parse()
                .map_err(|_| TransportError::protocol("bad attachment count"))?;
            rest = &rest[dash + 1..];
        }

        let mut namespace = "/".to_string();
        if rest.starts_with('/') {
            let end = rest.find(',').unwrap_or(rest.len());
            namespace = rest[..end].to_string();
            rest = rest.get(end + 1..).unwrap_or("");
        }

        let digits = rest.chars().take_while(|c| c.is_ascii_digit()).count();
        let id = if digits > 0 {
            let parsed = rest[..digits]
                .parse()
                .map_err(|_| TransportError::protocol("bad ack id"))?;
            rest = &rest[digits..];
            Some(parsed)
        } else {
            None
        };

        let data = if rest.is_empty() {
            None
        } else {
            Some(
                serde_json::from_str(rest)
                    .map_err(|e| TransportError::protocol(format!("bad packet data: {}", e)))?,
            )
        };

        Ok(Self {
            kind,
            namespace,
            data,
            id,
            attachments,
        })
    }

    pub fn encode(&self) -> String {
        let mut out = String::new();
        out.push(self.kind.as_char());
        if self.kind.is_binary() {
            out.push_str(&format!("{}-", self.attachments));
        }
        if self.namespace != "/" {
            out.push_str(&self.namespace);
            out.push(',');
        }
        if let Some(id) = self.id {
            out.push_str(&id.to_string());
        }
        if let Some(data) = &self.data {
            out.push_str(&data.to_string());
        }
        out
    }

    /// Turn an EVENT / BINARY_EVENT packet into an [`EventPacket`].
    ///
    /// Returns `None` when the data is not an array led by an event name.
    pub fn into_event(self) -> Option<EventPacket> {
        let mut items = match self.data {
            Some(Value::Array(items)) => items,
            _ => return None,
        };
        if items.is_empty() {
            return None;
        }
        let event = match items.remove(0) {
            Value::String(name) => name,
            _ => return None,
        };
        Some(EventPacket {
            namespace: self.namespace,
            event,
            args: items,
            ack_id: self.id,
        })
    }

    /// Message carried by a CONNECT_ERROR packet.
    pub fn error_message(&self) -> String {
        match &self.data {
            Some(Value::Object(map)) => map
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| Value::Object(map.clone()).to_string()),
            Some(Value::String(message)) => message.clone(),
            Some(other) => other.to_string(),
            None => "connection refused".to_string(),
        }
    }
}

/// Collects the binary attachments that follow a binary packet.
#[derive(Debug, Default)]
pub struct BinaryAssembler {
    pending: Option<(SocketPacket, Vec<Vec<u8>>)>,
}

impl BinaryAssembler {
    pub fn is_waiting(&self) -> bool {
        self.pending.is_some()
    }

    pub fn start(&mut self, packet: SocketPacket) {
        self.pending = Some((packet, Vec::new()));
    }

    /// Add an attachment; returns the completed packet once all arrived.
    pub fn push(&mut self, bytes: Vec<u8>) -> Option<SocketPacket> {
        let (packet, buffers) = self.pending.as_mut()?;
        buffers.push(bytes);
        if buffers.len() < packet.attachments {
            return None;
        }
        let (mut packet, buffers) = self.pending.take()?;
        packet.data = packet.data.map(|data| fill_placeholders(data, &buffers));
        Some(packet)
    }
}

/// Replace `{"_placeholder":true,"num":n}` markers with Buffer-style JSON.
pub fn fill_placeholders(value: Value, buffers: &[Vec<u8>]) -> Value {
    match value {
        Value::Object(map) => {
            let is_placeholder = map.get("_placeholder").and_then(Value::as_bool) == Some(true);
            if is_placeholder {
                let bytes = map
                    .get("num")
                    .and_then(Value::as_u64)
                    .and_then(|n| buffers.get(n as usize));
                if let Some(bytes) = bytes {
                    return json!({ "type": "Buffer", "data": bytes });
                }
                return Value::Object(map);
            }
            Value::Object(
                map.into_iter()
                    .map(|(k, v)| (k, fill_placeholders(v, buffers)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|v| fill_placeholders(v, buffers))
                .collect(),
        ),
        other => other,
    }
}
