//! Wildcard observation of incoming events.
//!
//! The transport only routes events to handlers bound by exact name. To see
//! every event, including names nobody registered, the session wraps the
//! transport's raw dispatch once with an [`ObservingDispatch`].

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::debug;

use super::{SessionEvent, SessionEventKind};
use crate::traits::{DispatchWrapper, EventPacket, PacketDispatch, EVENT_MESSAGE};

/// Reports each incoming event, then forwards it to the wrapped dispatch.
///
/// `"message"` is not reported here: the session binds a dedicated handler
/// to it, and reporting it twice would log it twice.
pub struct ObservingDispatch {
    inner: Arc<dyn PacketDispatch>,
    generation: u64,
    events: mpsc::UnboundedSender<SessionEvent>,
}

impl ObservingDispatch {
    pub fn new(
        inner: Arc<dyn PacketDispatch>,
        generation: u64,
        events: mpsc::UnboundedSender<SessionEvent>,
    ) -> Self {
        Self {
            inner,
            generation,
            events,
        }
    }

    /// A [`DispatchWrapper`] that installs an `ObservingDispatch`.
    pub fn wrapper(generation: u64, events: mpsc::UnboundedSender<SessionEvent>) -> DispatchWrapper {
        Box::new(move |inner: Arc<dyn PacketDispatch>| -> Arc<dyn PacketDispatch> {
            Arc::new(ObservingDispatch::new(inner, generation, events))
        })
    }
}

impl PacketDispatch for ObservingDispatch {
    fn dispatch(&self, packet: &EventPacket) {
        if packet.event != EVENT_MESSAGE {
            let event = SessionEvent::new(
                self.generation,
                SessionEventKind::Inbound {
                    event: packet.event.clone(),
                    args: packet.args.clone(),
                },
            );
            if self.events.send(event).is_err() {
                debug!("Session gone; not reporting '{}'", packet.event);
            }
        }
        self.inner.dispatch(packet);
    }
}
