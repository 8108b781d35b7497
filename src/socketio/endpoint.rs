//! Endpoint URL handling.
//!
//! The operator types a Socket.IO URL such as `http://host:3000/admin`. The
//! path selects the namespace; the Engine.IO traffic always goes to
//! `/socket.io/` on the same host.

use url::Url;

use crate::config::TransportKind;
use crate::error::TransportError;

/// Engine.IO protocol revision spoken by this client.
pub const ENGINE_IO_VERSION: &str = "4";

const ENGINE_PATH: &str = "/socket.io/";

/// A parsed Socket.IO endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct Endpoint {
    base: Url,
    namespace: String,
}

impl Endpoint {
    /// Parse an operator-supplied URL. A missing scheme means `http://`.
    ///
    /// The path, without a trailing slash, becomes the namespace.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::InvalidUrl`] for unparseable input, a scheme
    /// other than http, https, ws or wss, or a missing host.
    pub fn parse(input: &str) -> Result<Self, TransportError> {
        let trimmed = input.trim();
        let candidate = if trimmed.contains("://") {
            trimmed.to_string()
        } else {
            format!("http://{}", trimmed)
        };

        let invalid = |message: String| TransportError::InvalidUrl {
            url: input.to_string(),
            message,
        };

        let base = Url::parse(&candidate).map_err(|e| invalid(e.to_string()))?;
        match base.scheme() {
            "http" | "https" | "ws" | "wss" => {}
            other => return Err(invalid(format!("unsupported scheme '{}'", other))),
        }
        if base.host_str().is_none() {
            return Err(invalid("missing host".to_string()));
        }

        let path = base.path().trim_end_matches('/');
        let namespace = if path.is_empty() {
            "/".to_string()
        } else {
            path.to_string()
        };

        Ok(Self { base, namespace })
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The URL the operator gave, normalised.
    pub fn as_str(&self) -> &str {
        self.base.as_str()
    }

    /// Build the Engine.IO URL for a transport.
    pub fn engine_url(&self, kind: TransportKind, sid: Option<&str>) -> Result<Url, TransportError> {
        let mut url = self.base.clone();
        let secure = matches!(url.scheme(), "https" | "wss");
        let scheme = match (kind, secure) {
            (TransportKind::WebSocket, false) => "ws",
            (TransportKind::WebSocket, true) => "wss",
            (TransportKind::Polling, false) => "http",
            (TransportKind::Polling, true) => "https",
        };
        url.set_scheme(scheme).map_err(|_| TransportError::InvalidUrl {
            url: self.base.to_string(),
            message: format!("cannot switch scheme to {}", scheme),
        })?;
        url.set_path(ENGINE_PATH);
        url.set_fragment(None);

        let extra: Vec<(String, String)> = self
            .base
            .query_pairs()
            .filter(|(k, _)| !matches!(k.as_ref(), "EIO" | "transport" | "sid"))
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        {
            let mut query = url.query_pairs_mut();
            query.clear();
            for (k, v) in &extra {
                query.append_pair(k, v);
            }
            query.append_pair("EIO", ENGINE_IO_VERSION);
            query.append_pair("transport", kind.as_str());
            if let Some(sid) = sid {
                query.append_pair("sid", sid);
            }
        }

        Ok(url)
    }
}
