//! Client configuration.

use std::fmt;

use clap::ValueEnum;

/// Endpoint used when the operator does not give one.
pub const DEFAULT_URL: &str = "http://localhost:3000";

/// Event name used when the event field is left blank.
pub const DEFAULT_EVENT: &str = "message";

/// Engine.IO transports, in the order they may be tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum TransportKind {
    #[value(name = "websocket")]
    WebSocket,
    #[value(name = "polling")]
    Polling,
}

impl TransportKind {
    /// Name used in the Engine.IO `transport` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportKind::WebSocket => "websocket",
            TransportKind::Polling => "polling",
        }
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Default transport preference: websocket first, long-polling as fallback.
pub fn default_transports() -> Vec<TransportKind> {
    vec![TransportKind::WebSocket, TransportKind::Polling]
}

/// Resolved settings the interactive client starts with.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub url: String,
    pub token: String,
    pub event_name: String,
    pub transports: Vec<TransportKind>,
    /// Connect as soon as the UI is up.
    pub auto_connect: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            token: String::new(),
            event_name: DEFAULT_EVENT.to_string(),
            transports: default_transports(),
            auto_connect: false,
        }
    }
}

impl ClientConfig {
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = token.into();
        self
    }

    pub fn with_transports(mut self, transports: Vec<TransportKind>) -> Self {
        self.transports = transports;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_config_default() {
        let config = ClientConfig::default();
        assert_eq!(config.url, "http://localhost:3000");
        assert_eq!(config.token, "");
        assert_eq!(config.event_name, "message");
        assert_eq!(
            config.transports,
            vec![TransportKind::WebSocket, TransportKind::Polling]
        );
        assert!(!config.auto_connect);
    }

    #[test]
    fn test_builders() {
        let config = ClientConfig::default()
            .with_url("http://example.com:8080")
            .with_token("jwt")
            .with_transports(vec![TransportKind::Polling]);
        assert_eq!(config.url, "http://example.com:8080");
        assert_eq!(config.token, "jwt");
        assert_eq!(config.transports, vec![TransportKind::Polling]);
    }

    #[test]
    fn test_transport_kind_names() {
        assert_eq!(TransportKind::WebSocket.to_string(), "websocket");
        assert_eq!(TransportKind::Polling.as_str(), "polling");
    }
}
