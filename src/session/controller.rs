//! The façade the UI calls.
//!
//! Every outcome, success or failure, ends up as an [`EventLog`] entry;
//! nothing is returned to the caller as an error.

use tokio::sync::mpsc;
use tracing::warn;

use super::connection::{ConnectionSession, SessionState};
use super::SessionEvent;
use crate::codec::encode_for_send;
use crate::config::TransportKind;
use crate::error::SessionError;
use crate::event_log::{EventLog, LogEntry};
use crate::traits::{Transport, EVENT_MESSAGE};

/// One send request, built per call and then discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundIntent {
    pub event_name: String,
    pub raw_text: String,
}

impl OutboundIntent {
    /// A blank event name means `"message"`.
    pub fn new(event_name: &str, raw_text: &str) -> Self {
        let trimmed = event_name.trim();
        let event_name = if trimmed.is_empty() {
            EVENT_MESSAGE
        } else {
            trimmed
        };
        Self {
            event_name: event_name.to_string(),
            raw_text: raw_text.to_string(),
        }
    }
}

pub struct SessionController<T: Transport> {
    session: ConnectionSession<T>,
    log: EventLog,
}

impl<T: Transport> SessionController<T> {
    /// Build a controller and the receiver its transport reports arrive on.
    ///
    /// Feed everything from the receiver back into [`Self::handle_event`].
    pub fn new(
        transport: T,
        transports: Vec<TransportKind>,
    ) -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let controller = Self {
            session: ConnectionSession::new(transport, transports, tx),
            log: EventLog::new(),
        };
        (controller, rx)
    }

    /// Start connecting to `endpoint_url`, replacing any current connection.
    ///
    /// A URL the transport rejects is logged as a connect failure.
    pub fn connect(&mut self, endpoint_url: &str, credential: &str) {
        if let Err(e) = self.session.connect(endpoint_url, credential) {
            self.record_failure(&e);
        }
    }

    /// Close the connection and log "Disconnected by user". No-op when idle.
    pub fn disconnect(&mut self) {
        if let Some(entry) = self.session.disconnect() {
            self.log.append(entry);
        }
    }

    /// Send `raw_text` under `event_name`.
    ///
    /// Text starting with `{` must parse as JSON; anything else is sent as a
    /// string. Success and every failure each leave one log entry.
    ///
    /// # Arguments
    ///
    /// * `event_name` - Event to emit; blank means `"message"`
    /// * `raw_text` - Payload as typed by the operator
    pub fn send(&mut self, event_name: &str, raw_text: &str) {
        let intent = OutboundIntent::new(event_name, raw_text);
        match self.try_send(&intent) {
            Ok(entry) => self.log.append(entry),
            Err(e) => self.record_failure(&e),
        }
    }

    // Connection is checked before the text is parsed.
    fn try_send(&self, intent: &OutboundIntent) -> Result<LogEntry, SessionError> {
        self.session.ensure_connected()?;
        let payload = encode_for_send(&intent.raw_text)?;
        self.session.send(&intent.event_name, &payload)
    }

    /// Apply a transport report. Stale reports leave no trace.
    pub fn handle_event(&mut self, event: SessionEvent) {
        if let Some(entry) = self.session.apply(event) {
            self.log.append(entry);
        }
    }

    fn record_failure(&mut self, err: &SessionError) {
        warn!("{} ({})", err, err.error_code());
        self.log.append(LogEntry::from(err));
    }

    pub fn entries(&self) -> &[LogEntry] {
        self.log.entries()
    }

    pub fn log(&self) -> &EventLog {
        &self.log
    }

    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    pub fn session(&self) -> &ConnectionSession<T> {
        &self.session
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::MockTransport;
    use crate::config::default_transports;
    use crate::event_log::LogCategory;
    use serde_json::json;

    struct Harness {
        controller: SessionController<MockTransport>,
        transport: MockTransport,
        rx: mpsc::UnboundedReceiver<SessionEvent>,
    }

    impl Harness {
        fn new() -> Self {
            let transport = MockTransport::new();
            let (controller, rx) = SessionController::new(transport.clone(), default_transports());
            Self {
                controller,
                transport,
                rx,
            }
        }

        fn pump(&mut self) {
            while let Ok(event) = self.rx.try_recv() {
                self.controller.handle_event(event);
            }
        }

        fn connect(&mut self) {
            self.controller.connect("http://localhost:3000", "tok");
            self.transport.last_socket().unwrap().simulate_connect("sid-1");
            self.pump();
        }

        fn texts(&self) -> Vec<&str> {
            self.controller.entries().iter().map(|e| e.text()).collect()
        }
    }

    #[test]
    fn test_intent_defaults_blank_name() {
        assert_eq!(OutboundIntent::new("", "x").event_name, "message");
        assert_eq!(OutboundIntent::new("  ", "x").event_name, "message");
        assert_eq!(OutboundIntent::new("chat", "x").event_name, "chat");
    }

    #[test]
    fn test_send_before_connect_logs_not_connected() {
        let mut h = Harness::new();
        h.controller.send("message", "hello");

        assert_eq!(h.controller.entries().len(), 1);
        let entry = &h.controller.entries()[0];
        assert_eq!(entry.category(), LogCategory::Error);
        assert_eq!(entry.text(), "Cannot send: Not connected");
        assert!(h
            .controller
            .entries()
            .iter()
            .all(|e| e.category() != LogCategory::Outbound));
    }

    #[test]
    fn test_not_connected_wins_over_bad_json() {
        let mut h = Harness::new();
        h.controller.send("message", "{bad json");
        assert_eq!(h.texts(), vec!["Cannot send: Not connected"]);
    }

    #[test]
    fn test_send_json_and_text() {
        let mut h = Harness::new();
        h.connect();
        h.controller.send("chat", r#"{"a":1}"#);
        h.controller.send("", "hello");

        let socket = h.transport.last_socket().unwrap();
        assert_eq!(
            socket.emitted(),
            vec![
                ("chat".to_string(), json!({"a": 1})),
                ("message".to_string(), json!("hello")),
            ]
        );
        assert_eq!(
            h.texts(),
            vec![
                "Connected: sid-1",
                r#"Sent 'chat': {"a":1}"#,
                r#"Sent 'message': "hello""#,
            ]
        );
    }

    #[test]
    fn test_bad_json_is_logged_and_connection_survives() {
        let mut h = Harness::new();
        h.connect();
        h.controller.send("chat", "{bad json");

        let last = h.controller.log().last().unwrap();
        assert_eq!(last.category(), LogCategory::Error);
        assert!(last.text().starts_with("JSON format error: "));
        assert_eq!(h.controller.state(), SessionState::Connected);
        assert!(h.transport.last_socket().unwrap().emitted().is_empty());

        h.controller.send("chat", "fine");
        assert_eq!(h.transport.last_socket().unwrap().emitted().len(), 1);
    }

    #[test]
    fn test_invalid_url_logged_as_connect_error() {
        let mut h = Harness::new();
        h.transport.fail_next_socket("unsupported scheme 'ftp'");
        h.controller.connect("ftp://x", "");
        assert_eq!(h.controller.state(), SessionState::Errored);
        assert_eq!(h.controller.entries().len(), 1);
        assert!(h.texts()[0].starts_with("Connect error: "));
    }

    #[test]
    fn test_disconnect_logs_local_action_once() {
        let mut h = Harness::new();
        h.connect();
        h.controller.disconnect();
        h.transport
            .last_socket()
            .unwrap()
            .simulate_disconnect("io client disconnect");
        h.pump();
        h.controller.disconnect();

        assert_eq!(h.texts(), vec!["Connected: sid-1", "Disconnected by user"]);
    }

    #[test]
    fn test_session_persists_across_connects() {
        let mut h = Harness::new();
        h.connect();
        h.connect();
        assert_eq!(h.transport.socket_count(), 2);
        assert_eq!(h.controller.session().generation(), 2);
        assert_eq!(
            h.texts(),
            vec!["Connected: sid-1", "Connected: sid-1"]
        );
    }
}
