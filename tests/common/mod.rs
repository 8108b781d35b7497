//! Common test utilities for integration tests.

#![allow(dead_code)]

use std::time::Duration;

use sioprobe::session::{SessionController, SessionEvent};
use sioprobe::traits::Transport;
use tokio::sync::mpsc;

/// How long live tests wait for the transport before giving up.
pub const LIVE_TIMEOUT: Duration = Duration::from_secs(10);

/// Feed every queued report into the controller.
pub fn pump<T: Transport>(
    controller: &mut SessionController<T>,
    rx: &mut mpsc::UnboundedReceiver<SessionEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        controller.handle_event(event);
    }
}

/// Feed reports into the controller until `done` holds or the timeout hits.
///
/// Returns whether `done` held.
pub async fn pump_until<T, F>(
    controller: &mut SessionController<T>,
    rx: &mut mpsc::UnboundedReceiver<SessionEvent>,
    done: F,
) -> bool
where
    T: Transport,
    F: Fn(&SessionController<T>) -> bool,
{
    let deadline = tokio::time::Instant::now() + LIVE_TIMEOUT;
    while !done(controller) {
        match tokio::time::timeout_at(deadline, rx.recv()).await {
            Ok(Some(event)) => controller.handle_event(event),
            Ok(None) | Err(_) => return false,
        }
    }
    true
}

/// Log texts, oldest first.
pub fn texts<T: Transport>(controller: &SessionController<T>) -> Vec<String> {
    controller
        .entries()
        .iter()
        .map(|e| e.text().to_string())
        .collect()
}

/// Whether any entry's text equals `text`.
pub fn has_entry<T: Transport>(controller: &SessionController<T>, text: &str) -> bool {
    controller.entries().iter().any(|e| e.text() == text)
}

/// Engine.IO open packet used by the test servers.
pub fn open_packet(sid: &str) -> String {
    open_packet_with_heartbeat(sid, 25000, 20000)
}

/// Open packet advertising the given heartbeat, in milliseconds.
pub fn open_packet_with_heartbeat(sid: &str, ping_interval: u64, ping_timeout: u64) -> String {
    format!(
        r#"0{{"sid":"{}","upgrades":[],"pingInterval":{},"pingTimeout":{},"maxPayload":1000000}}"#,
        sid, ping_interval, ping_timeout
    )
}

/// A local address nothing is listening on.
pub async fn unused_addr() -> std::net::SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}
