//! Mock implementations for testing.
//!
//! Lets the session be exercised without a server: tests create sockets
//! through [`MockTransport`] and then drive their lifecycle by hand.

pub mod transport;

pub use transport::{MockSocket, MockTransport};
