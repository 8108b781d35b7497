//! Engine.IO transports.
//!
//! Each transport is opened into an [`EngineConnection`]: a background reader
//! task pushing [`EngineEvent`]s into a channel, plus a writer half used by
//! the socket loop. Transports are tried in the configured order.

use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use reqwest::header::CONTENT_TYPE;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};
use url::Url;

use super::endpoint::Endpoint;
use super::packet::{decode_payload, encode_payload, EnginePacket, Handshake};
use crate::config::TransportKind;
use crate::error::TransportError;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;
type WsSource = SplitStream<WsStream>;

const WEBSOCKET_LABEL: &str = "websocket";
const POLLING_LABEL: &str = "xhr poll";

/// Close reason when the peer or the network ends the transport.
pub const REASON_TRANSPORT_CLOSE: &str = "transport close";
/// Close reason when the transport fails with an error.
pub const REASON_TRANSPORT_ERROR: &str = "transport error";

/// What the reader task delivers.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    Packet(EnginePacket),
    /// The transport is gone; carries the close reason.
    Closed(String),
}

/// Write half of an engine transport.
#[async_trait]
pub trait EngineWriter: Send {
    async fn send(&mut self, packets: Vec<EnginePacket>) -> Result<(), TransportError>;
    async fn close(&mut self);
}

/// An open Engine.IO session.
pub struct EngineConnection {
    kind: TransportKind,
    handshake: Handshake,
    incoming: mpsc::UnboundedReceiver<EngineEvent>,
    writer: Box<dyn EngineWriter>,
    reader: JoinHandle<()>,
}

impl EngineConnection {
    pub fn kind(&self) -> TransportKind {
        self.kind
    }

    pub fn handshake(&self) -> &Handshake {
        &self.handshake
    }

    /// Next event from the reader task. Cancel-safe.
    pub async fn recv(&mut self) -> Option<EngineEvent> {
        self.incoming.recv().await
    }

    pub async fn send(&mut self, packets: Vec<EnginePacket>) -> Result<(), TransportError> {
        self.writer.send(packets).await
    }

    pub async fn close(&mut self) {
        self.writer.close().await;
        self.reader.abort();
    }
}

impl Drop for EngineConnection {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

/// Open the first transport in `transports` that completes a handshake.
///
/// Transports are tried in order; a failure is logged and the next one is
/// tried.
///
/// # Errors
///
/// Returns the last transport's error when none succeeds, or
/// [`TransportError::ConnectionFailed`] when `transports` is empty.
pub async fn open(
    endpoint: &Endpoint,
    transports: &[TransportKind],
) -> Result<EngineConnection, TransportError> {
    let mut last_error = None;

    for kind in transports {
        let attempt = match kind {
            TransportKind::WebSocket => open_websocket(endpoint).await,
            TransportKind::Polling => open_polling(endpoint).await,
        };
        match attempt {
            Ok(conn) => {
                info!(
                    "Engine.IO {} transport open (sid {})",
                    kind, conn.handshake.sid
                );
                return Ok(conn);
            }
            Err(e) => {
                warn!("{} transport failed: {}", kind, e);
                last_error = Some(e);
            }
        }
    }

    Err(last_error.unwrap_or_else(|| TransportError::ConnectionFailed {
        transport: "engine",
        message: "no transports configured".to_string(),
    }))
}

// ============================================================================
// WebSocket
// ============================================================================

fn websocket_failed<M: ToString>(message: M) -> TransportError {
    TransportError::ConnectionFailed {
        transport: WEBSOCKET_LABEL,
        message: message.to_string(),
    }
}

async fn open_websocket(endpoint: &Endpoint) -> Result<EngineConnection, TransportError> {
    let url = endpoint.engine_url(TransportKind::WebSocket, None)?;
    debug!("Opening websocket {}", url);

    let (stream, _) = connect_async(url.as_str())
        .await
        .map_err(websocket_failed)?;
    let (sink, mut source) = stream.split();

    let handshake = loop {
        match source.next().await {
            Some(Ok(Message::Text(text))) => match EnginePacket::decode(&text)? {
                EnginePacket::Open(handshake) => break handshake,
                other => {
                    return Err(TransportError::protocol(format!(
                        "expected open packet, got {:?}",
                        other
                    )))
                }
            },
            Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => continue,
            Some(Ok(other)) => {
                return Err(TransportError::protocol(format!(
                    "expected open packet, got {:?}",
                    other
                )))
            }
            Some(Err(e)) => return Err(websocket_failed(e)),
            None => return Err(websocket_failed("closed before handshake")),
        }
    };

    let (tx, rx) = mpsc::unbounded_channel();
    let reader = tokio::spawn(read_websocket(source, tx));

    Ok(EngineConnection {
        kind: TransportKind::WebSocket,
        handshake,
        incoming: rx,
        writer: Box::new(WebSocketWriter { sink }),
        reader,
    })
}

async fn read_websocket(mut source: WsSource, tx: mpsc::UnboundedSender<EngineEvent>) {
    let reason = loop {
        let event = match source.next().await {
            Some(Ok(Message::Text(text))) => match EnginePacket::decode(&text) {
                Ok(packet) => EngineEvent::Packet(packet),
                Err(e) => {
                    warn!("Dropping malformed engine packet: {} - {}", e, text);
                    continue;
                }
            },
            Some(Ok(Message::Binary(bytes))) => EngineEvent::Packet(EnginePacket::Binary(bytes)),
            Some(Ok(Message::Close(frame))) => {
                debug!("Received close frame: {:?}", frame);
                break REASON_TRANSPORT_CLOSE;
            }
            Some(Ok(_)) => continue,
            Some(Err(e)) => {
                warn!("WebSocket error: {}", e);
                break REASON_TRANSPORT_ERROR;
            }
            None => break REASON_TRANSPORT_CLOSE,
        };
        if tx.send(event).is_err() {
            return;
        }
    };
    let _ = tx.send(EngineEvent::Closed(reason.to_string()));
}

struct WebSocketWriter {
    sink: WsSink,
}

#[async_trait]
impl EngineWriter for WebSocketWriter {
    async fn send(&mut self, packets: Vec<EnginePacket>) -> Result<(), TransportError> {
        for packet in packets {
            let message = match packet {
                EnginePacket::Binary(bytes) => Message::Binary(bytes),
                other => Message::Text(other.encode()),
            };
            self.sink.send(message).await.map_err(websocket_failed)?;
        }
        Ok(())
    }

    async fn close(&mut self) {
        if let Err(e) = self.sink.close().await {
            debug!("Error closing websocket: {}", e);
        }
    }
}

// ============================================================================
// HTTP long-polling
// ============================================================================

fn polling_failed<M: ToString>(message: M) -> TransportError {
    TransportError::ConnectionFailed {
        transport: POLLING_LABEL,
        message: message.to_string(),
    }
}

async fn fetch(http: &reqwest::Client, url: &Url) -> Result<String, TransportError> {
    Ok(http
        .get(url.as_str())
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?)
}

async fn open_polling(endpoint: &Endpoint) -> Result<EngineConnection, TransportError> {
    let http = reqwest::Client::new();
    let url = endpoint.engine_url(TransportKind::Polling, None)?;
    debug!("Opening polling session {}", url);

    let body = fetch(&http, &url).await.map_err(|e| match e {
        TransportError::Http { message } => polling_failed(message),
        other => other,
    })?;
    let mut packets = decode_payload(&body)?.into_iter();
    let handshake = match packets.next() {
        Some(EnginePacket::Open(handshake)) => handshake,
        other => {
            return Err(TransportError::protocol(format!(
                "expected open packet, got {:?}",
                other
            )))
        }
    };

    let (tx, rx) = mpsc::unbounded_channel();
    for packet in packets {
        let _ = tx.send(EngineEvent::Packet(packet));
    }

    let session_url = endpoint.engine_url(TransportKind::Polling, Some(&handshake.sid))?;
    let reader = tokio::spawn(poll_loop(http.clone(), session_url.clone(), tx));

    Ok(EngineConnection {
        kind: TransportKind::Polling,
        handshake,
        incoming: rx,
        writer: Box::new(PollingWriter {
            http,
            url: session_url,
        }),
        reader,
    })
}

async fn poll_loop(http: reqwest::Client, url: Url, tx: mpsc::UnboundedSender<EngineEvent>) {
    loop {
        let body = match fetch(&http, &url).await {
            Ok(body) => body,
            Err(e) => {
                warn!("Poll failed: {}", e);
                let _ = tx.send(EngineEvent::Closed(REASON_TRANSPORT_ERROR.to_string()));
                return;
            }
        };

        let packets = match decode_payload(&body) {
            Ok(packets) => packets,
            Err(e) => {
                warn!("Dropping malformed poll payload: {} - {}", e, body);
                continue;
            }
        };

        for packet in packets {
            let closing = packet == EnginePacket::Close;
            if tx.send(EngineEvent::Packet(packet)).is_err() || closing {
                return;
            }
        }
    }
}

struct PollingWriter {
    http: reqwest::Client,
    url: Url,
}

#[async_trait]
impl EngineWriter for PollingWriter {
    async fn send(&mut self, packets: Vec<EnginePacket>) -> Result<(), TransportError> {
        self.http
            .post(self.url.as_str())
            .header(CONTENT_TYPE, "text/plain;charset=UTF-8")
            .body(encode_payload(&packets))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn close(&mut self) {
        if let Err(e) = self.send(vec![EnginePacket::Close]).await {
            debug!("Error closing polling session: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_fails_without_transports() {
        let endpoint = Endpoint::parse("http://127.0.0.1:59998").unwrap();
        let result = open(&endpoint, &[]).await;
        assert!(matches!(
            result,
            Err(TransportError::ConnectionFailed {
                transport: "engine",
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_open_reports_last_failure() {
        // Nothing listens on this port.
        let endpoint = Endpoint::parse("http://127.0.0.1:59998").unwrap();
        let result = open(
            &endpoint,
            &[TransportKind::WebSocket, TransportKind::Polling],
        )
        .await;

        match result {
            Err(TransportError::ConnectionFailed { transport, message }) => {
                assert_eq!(transport, POLLING_LABEL);
                assert!(!message.is_empty());
            }
            Err(other) => panic!("Expected ConnectionFailed, got {:?}", other),
            Ok(_) => panic!("Expected connection to fail"),
        }
    }

    #[tokio::test]
    async fn test_websocket_failure_label() {
        let endpoint = Endpoint::parse("http://127.0.0.1:59998").unwrap();
        let err = open(&endpoint, &[TransportKind::WebSocket])
            .await
            .err()
            .unwrap();
        assert!(err.to_string().starts_with("websocket error"));
    }
}
