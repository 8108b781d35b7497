//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::config::{ClientConfig, TransportKind, DEFAULT_EVENT, DEFAULT_URL};

/// Interactive Socket.IO diagnostic client.
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "sioprobe", version, about = "Interactive Socket.IO diagnostic client")]
pub struct Args {
    /// Socket.IO endpoint; the path selects the namespace.
    #[arg(short, long, env = "SIOPROBE_URL", default_value = DEFAULT_URL)]
    pub url: String,

    /// Token sent as `{"token": ...}` in the connect auth payload.
    #[arg(short, long, env = "SIOPROBE_TOKEN", default_value = "", hide_env_values = true)]
    pub token: String,

    /// Initial event name for the send form.
    #[arg(short, long, default_value = DEFAULT_EVENT)]
    pub event: String,

    /// Transports to try, in order.
    #[arg(
        long,
        value_enum,
        value_delimiter = ',',
        default_values_t = [TransportKind::WebSocket, TransportKind::Polling]
    )]
    pub transports: Vec<TransportKind>,

    /// Connect immediately on startup.
    #[arg(long)]
    pub connect: bool,

    /// Log file (defaults to the user cache directory).
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Log level when RUST_LOG is unset.
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Args {
    /// The settings the interactive client starts with.
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            url: self.url.clone(),
            token: self.token.clone(),
            event_name: self.event.clone(),
            transports: self.transports.clone(),
            auto_connect: self.connect,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("sioprobe").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_command_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_transport_list() {
        let args = parse(&["--transports", "polling"]);
        assert_eq!(args.transports, vec![TransportKind::Polling]);

        let args = parse(&["--transports", "polling,websocket"]);
        assert_eq!(
            args.transports,
            vec![TransportKind::Polling, TransportKind::WebSocket]
        );
    }

    #[test]
    fn test_rejects_unknown_transport() {
        let result = Args::try_parse_from(["sioprobe", "--transports", "carrier-pigeon"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_client_config_from_flags() {
        let args = parse(&[
            "-u",
            "http://example.com:8080/admin",
            "-t",
            "secret",
            "-e",
            "chat",
            "--connect",
        ]);
        let config = args.client_config();
        assert_eq!(config.url, "http://example.com:8080/admin");
        assert_eq!(config.token, "secret");
        assert_eq!(config.event_name, "chat");
        assert!(config.auto_connect);
    }
}
