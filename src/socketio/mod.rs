//! Socket.IO v5 client over Engine.IO v4.
//!
//! - [`endpoint`]: URL parsing and Engine.IO URL construction
//! - [`packet`]: Engine.IO and Socket.IO packet codecs
//! - [`engine`]: websocket and long-polling transports
//! - [`dispatch`]: named handlers and the replaceable raw dispatch
//! - [`socket`]: the connection task tying it all together

pub mod dispatch;
pub mod endpoint;
pub mod engine;
pub mod packet;
pub mod socket;

pub use dispatch::{DispatchSlot, HandlerRegistry, NamedDispatch};
pub use endpoint::Endpoint;
pub use socket::{
    Socket, REASON_IO_CLIENT_DISCONNECT, REASON_IO_SERVER_DISCONNECT, REASON_PING_TIMEOUT,
};
