//! Trait abstractions for dependency injection and testability.
//!
//! - [`Transport`] / [`TransportHandle`]: the real-time transport capability set
//! - [`PacketDispatch`]: the raw dispatch seam every incoming event passes through

pub mod transport;

pub use transport::{
    ConnectOptions, DispatchWrapper, EventHandler, EventPacket, PacketDispatch, Transport,
    TransportHandle, EVENT_CONNECT, EVENT_CONNECT_ERROR, EVENT_DISCONNECT, EVENT_MESSAGE,
};
