//! Live round trip over the websocket transport against a scripted server.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{has_entry, open_packet, open_packet_with_heartbeat, pump_until, texts, unused_addr};
use futures_util::{SinkExt, Stream, StreamExt};
use serde_json::Value;
use sioprobe::adapters::SocketIoTransport;
use sioprobe::config::TransportKind;
use sioprobe::session::{SessionController, SessionState};
use sioprobe::socketio::{Endpoint, Socket};
use sioprobe::traits::{
    ConnectOptions, TransportHandle, EVENT_CONNECT, EVENT_CONNECT_ERROR, EVENT_DISCONNECT,
};
use tokio::net::TcpListener;
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::tungstenite::Message;

/// Accept one websocket client and play a short Socket.IO conversation.
///
/// Returns every text frame the client sent.
async fn scripted_server(listener: TcpListener, ready_for_chat: oneshot::Sender<()>) -> Vec<String> {
    let (stream, _) = listener.accept().await.unwrap();
    let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
    let mut received = Vec::new();

    ws.send(Message::Text(open_packet("eio-1"))).await.unwrap();

    // Namespace CONNECT with auth
    let connect = next_text(&mut ws).await;
    received.push(connect);
    ws.send(Message::Text(r#"40{"sid":"sock-1"}"#.to_string()))
        .await
        .unwrap();

    ws.send(Message::Text(r#"42["news",{"a":1}]"#.to_string()))
        .await
        .unwrap();
    ws.send(Message::Text(r#"42["message","hi"]"#.to_string()))
        .await
        .unwrap();
    ws.send(Message::Text("2".to_string())).await.unwrap();

    let pong = next_text(&mut ws).await;
    received.push(pong);
    let _ = ready_for_chat.send(());

    let chat = next_text(&mut ws).await;
    received.push(chat);

    // Server-side namespace disconnect
    ws.send(Message::Text("41".to_string())).await.unwrap();
    while let Some(Ok(msg)) = ws.next().await {
        if let Message::Text(text) = msg {
            received.push(text);
        }
    }
    received
}

/// Accept one websocket client, join it to the root namespace as `sid`, then
/// stay silent. Returns the text frames sent after the join.
async fn silent_server(listener: TcpListener, open: String, sid: &'static str) -> Vec<String> {
    let (stream, _) = listener.accept().await.unwrap();
    let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
    ws.send(Message::Text(open)).await.unwrap();
    let _connect = next_text(&mut ws).await;
    ws.send(Message::Text(format!(r#"40{{"sid":"{}"}}"#, sid)))
        .await
        .unwrap();
    let mut rest = Vec::new();
    while let Some(Ok(msg)) = ws.next().await {
        if let Message::Text(text) = msg {
            rest.push(text);
        }
    }
    rest
}

/// Record every lifecycle callback a socket fires as `"name:args"`.
fn record_lifecycle(socket: &Socket) -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    for name in [EVENT_CONNECT, EVENT_DISCONNECT, EVENT_CONNECT_ERROR] {
        let tx = tx.clone();
        socket.on(
            name,
            Arc::new(move |args: &[Value]| {
                let _ = tx.send(format!("{}:{}", name, Value::from(args.to_vec())));
            }),
        );
    }
    rx
}

async fn next_callback(rx: &mut mpsc::UnboundedReceiver<String>) -> String {
    tokio::time::timeout(common::LIVE_TIMEOUT, rx.recv())
        .await
        .expect("socket callback should fire")
        .unwrap()
}

async fn next_text<S>(ws: &mut S) -> String
where
    S: Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin,
{
    loop {
        match ws.next().await {
            Some(Ok(Message::Text(text))) => return text,
            Some(Ok(_)) => continue,
            other => panic!("Expected a text frame, got {:?}", other),
        }
    }
}

#[tokio::test]
async fn test_websocket_round_trip() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (ready_tx, ready_rx) = oneshot::channel();
    let server = tokio::spawn(scripted_server(listener, ready_tx));

    let (mut controller, mut rx) =
        SessionController::new(SocketIoTransport::new(), vec![TransportKind::WebSocket]);
    controller.connect(&format!("http://{}", addr), "secret");
    assert_eq!(controller.state(), SessionState::Connecting);

    assert!(
        pump_until(&mut controller, &mut rx, |c| {
            has_entry(c, r#"Received 'message': "hi""#)
        })
        .await,
        "log so far: {:?}",
        texts(&controller)
    );
    assert_eq!(controller.state(), SessionState::Connected);
    assert_eq!(
        controller.session().socket_id(),
        Some("sock-1".to_string())
    );

    ready_rx.await.unwrap();
    controller.send("chat", r#"{"x":1}"#);

    assert!(
        pump_until(&mut controller, &mut rx, |c| {
            c.state() == SessionState::Disconnected
        })
        .await,
        "log so far: {:?}",
        texts(&controller)
    );

    assert_eq!(
        texts(&controller),
        vec![
            "Connected: sock-1",
            r#"Received 'news': {"a":1}"#,
            r#"Received 'message': "hi""#,
            r#"Sent 'chat': {"x":1}"#,
            "Disconnected: io server disconnect",
        ]
    );

    let received = tokio::time::timeout(common::LIVE_TIMEOUT, server)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(received[0], r#"40{"token":"secret"}"#);
    assert_eq!(received[1], "3");
    assert_eq!(received[2], r#"42["chat",{"x":1}]"#);
}

#[tokio::test]
async fn test_websocket_unreachable_reports_connect_error() {
    let addr = unused_addr().await;
    let (mut controller, mut rx) =
        SessionController::new(SocketIoTransport::new(), vec![TransportKind::WebSocket]);
    controller.connect(&format!("http://{}", addr), "");

    assert!(pump_until(&mut controller, &mut rx, |c| !c.entries().is_empty()).await);
    let entry = &controller.entries()[0];
    assert!(
        entry.text().starts_with("Connect error: websocket error"),
        "got {}",
        entry.text()
    );
    assert_eq!(controller.state(), SessionState::Errored);
}

#[tokio::test]
async fn test_local_disconnect_sends_namespace_disconnect() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(silent_server(listener, open_packet("eio-2"), "sock-2"));

    let (mut controller, mut rx) =
        SessionController::new(SocketIoTransport::new(), vec![TransportKind::WebSocket]);
    controller.connect(&format!("ws://{}", addr), "");
    assert!(pump_until(&mut controller, &mut rx, |c| c.state() == SessionState::Connected).await);

    controller.disconnect();
    assert_eq!(controller.state(), SessionState::Disconnected);

    let rest = tokio::time::timeout(common::LIVE_TIMEOUT, server)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(rest, vec!["41".to_string()]);

    // The socket's own disconnect report belongs to a retired generation.
    tokio::time::sleep(Duration::from_millis(100)).await;
    common::pump(&mut controller, &mut rx);
    assert_eq!(
        texts(&controller),
        vec!["Connected: sock-2", "Disconnected by user"]
    );
}

#[tokio::test]
async fn test_socket_local_disconnect_fires_disconnect_callback() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(silent_server(listener, open_packet("eio-3"), "sock-3"));

    let socket = Socket::new(
        Endpoint::parse(&format!("http://{}", addr)).unwrap(),
        ConnectOptions::new(vec![TransportKind::WebSocket]),
    );
    let mut callbacks = record_lifecycle(&socket);
    socket.connect();

    assert_eq!(next_callback(&mut callbacks).await, r#"connect:["sock-3"]"#);
    assert!(socket.is_connected());

    socket.disconnect();
    assert!(!socket.is_connected());
    assert_eq!(
        next_callback(&mut callbacks).await,
        r#"disconnect:["io client disconnect"]"#
    );

    let rest = tokio::time::timeout(common::LIVE_TIMEOUT, server)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(rest, vec!["41".to_string()]);
    assert!(callbacks.try_recv().is_err());
}

#[tokio::test]
async fn test_silent_server_triggers_ping_timeout() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let open = open_packet_with_heartbeat("eio-4", 100, 100);
    let server = tokio::spawn(silent_server(listener, open, "sock-4"));

    let (mut controller, mut rx) =
        SessionController::new(SocketIoTransport::new(), vec![TransportKind::WebSocket]);
    controller.connect(&format!("http://{}", addr), "");

    assert!(
        pump_until(&mut controller, &mut rx, |c| {
            c.state() == SessionState::Disconnected
        })
        .await,
        "log so far: {:?}",
        texts(&controller)
    );
    assert_eq!(
        texts(&controller),
        vec!["Connected: sock-4", "Disconnected: ping timeout"]
    );

    // The client closes the transport without leaving the namespace.
    let rest = tokio::time::timeout(common::LIVE_TIMEOUT, server)
        .await
        .unwrap()
        .unwrap();
    assert!(rest.is_empty(), "unexpected frames: {:?}", rest);
}
