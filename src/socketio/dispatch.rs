//! Named-handler routing and the replaceable raw dispatch slot.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use serde_json::Value;

use crate::traits::{DispatchWrapper, EventHandler, EventPacket, PacketDispatch};

/// Handlers keyed by exact event name.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: RwLock<HashMap<String, Vec<EventHandler>>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(&self, event: &str, handler: EventHandler) {
        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(event.to_string())
            .or_default()
            .push(handler);
    }

    /// Call every handler bound to `event`. Returns how many ran.
    pub fn emit(&self, event: &str, args: &[Value]) -> usize {
        // Clone the list so handlers may register more handlers.
        let handlers: Vec<EventHandler> = self
            .handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(event)
            .cloned()
            .unwrap_or_default();
        for handler in &handlers {
            handler(args);
        }
        handlers.len()
    }

    pub fn handler_count(&self, event: &str) -> usize {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(event)
            .map_or(0, Vec::len)
    }
}

/// Default raw dispatch: route each packet to the handlers bound to its name.
pub struct NamedDispatch {
    registry: Arc<HandlerRegistry>,
}

impl NamedDispatch {
    pub fn new(registry: Arc<HandlerRegistry>) -> Self {
        Self { registry }
    }
}

impl PacketDispatch for NamedDispatch {
    fn dispatch(&self, packet: &EventPacket) {
        let handled = self.registry.emit(&packet.event, &packet.args);
        if handled == 0 {
            tracing::trace!("no handler bound for '{}'", packet.event);
        }
    }
}

/// Holds the current raw dispatch and lets it be wrapped.
pub struct DispatchSlot {
    current: RwLock<Arc<dyn PacketDispatch>>,
}

impl DispatchSlot {
    pub fn new(initial: Arc<dyn PacketDispatch>) -> Self {
        Self {
            current: RwLock::new(initial),
        }
    }

    /// Replace the dispatch with `wrap(current)`.
    pub fn intercept(&self, wrap: DispatchWrapper) {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let wrapped = wrap(Arc::clone(&*current));
        *current = wrapped;
    }

    /// Hand a packet to the current dispatch.
    pub fn dispatch(&self, packet: &EventPacket) {
        let dispatch = Arc::clone(&*self.current.read().unwrap_or_else(PoisonError::into_inner));
        dispatch.dispatch(packet);
    }
}
