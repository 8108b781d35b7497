//! Concrete implementations of trait abstractions.
//!
//! # Adapters
//!
//! - [`SocketIoTransport`] - Socket.IO client over websocket / long-polling
//!
//! # Mock Implementations
//!
//! The [`mock`] submodule provides test doubles:
//! - [`mock::MockTransport`] - Records created sockets
//! - [`mock::MockSocket`] - Lifecycle and event injection

pub mod mock;
pub mod socketio;

pub use mock::{MockSocket, MockTransport};
pub use socketio::SocketIoTransport;
