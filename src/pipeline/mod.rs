//! Value pipeline.
//!
//! Routes decoded port values to the handlers registered for their
//! `(port, mode)` key. Delivery is synchronous and follows arrival order, so
//! a handler that sees value N has already seen value N-1 for the same key.
//! Values for keys nobody registered are dropped.

pub mod property;

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use crate::types::{ModeScale, ModeValue, Value};

pub use property::Property;

/// Handle returned by [`ValuePipeline::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler = Arc<dyn Fn(&[u8]) + Send + Sync>;

struct Route {
    id: SubscriptionId,
    handler: Handler,
}

/// Per-hub dispatch table for mode values.
#[derive(Default)]
pub struct ValuePipeline {
    routes: RwLock<HashMap<(u8, u8), Vec<Route>>>,
    port_modes: RwLock<HashMap<u8, u8>>,
    next_id: AtomicU64,
}

impl ValuePipeline {
    /// Creates an empty pipeline.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler for values of `(port_id, mode)`.
    ///
    /// Raw values are read as `T` and calibrated with `scale` before the
    /// handler sees them.
    pub fn subscribe<T, F>(&self, port_id: u8, mode: u8, scale: ModeScale, handler: F) -> SubscriptionId
    where
        T: ModeValue,
        F: Fn(Value<T>) + Send + Sync + 'static,
    {
        let width = T::DATA_TYPE.width();
        let handler: Handler = Arc::new(move |data: &[u8]| {
            if data.len() < width {
                tracing::warn!(
                    "value for port {port_id} mode {mode} too short: need {width} bytes, got {}",
                    data.len()
                );
                return;
            }
            handler(scale.calibrate(T::read_le(data)));
        });

        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.routes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry((port_id, mode))
            .or_default()
            .push(Route { id, handler });

        tracing::debug!("subscribed {id:?} to port {port_id} mode {mode}");
        id
    }

    /// Routes values of `(port_id, mode)` into `property`.
    pub fn bind<T: ModeValue>(
        &self,
        port_id: u8,
        mode: u8,
        scale: ModeScale,
        property: &Arc<Property<T>>,
    ) -> SubscriptionId {
        let property = Arc::clone(property);
        self.subscribe(port_id, mode, scale, move |value| property.set(value))
    }

    /// Removes a handler. Returns false if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut routes = self.routes.write().unwrap_or_else(PoisonError::into_inner);
        let mut removed = false;
        routes.retain(|_, handlers| {
            let before = handlers.len();
            handlers.retain(|route| route.id != id);
            removed |= handlers.len() != before;
            !handlers.is_empty()
        });
        removed
    }

    /// Records the mode a port currently reports values for.
    pub fn set_port_mode(&self, port_id: u8, mode: u8) {
        self.port_modes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(port_id, mode);
    }

    /// Returns the mode a port currently reports values for.
    #[must_use]
    pub fn port_mode(&self, port_id: u8) -> Option<u8> {
        self.port_modes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&port_id)
            .copied()
    }

    /// Forgets the current mode of a detached port.
    pub fn clear_port(&self, port_id: u8) {
        self.port_modes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&port_id);
    }

    /// Delivers a raw value to every handler of `(port_id, mode)`.
    ///
    /// Returns the number of handlers that received it.
    pub fn dispatch(&self, port_id: u8, mode: u8, data: &[u8]) -> usize {
        // Handlers run without the lock held so they may subscribe or unsubscribe.
        let handlers: Vec<Handler> = {
            let routes = self.routes.read().unwrap_or_else(PoisonError::into_inner);
            match routes.get(&(port_id, mode)) {
                Some(routes) => routes.iter().map(|route| Arc::clone(&route.handler)).collect(),
                None => {
                    tracing::trace!("no subscribers for port {port_id} mode {mode}");
                    return 0;
                }
            }
        };

        for handler in &handlers {
            handler(data);
        }
        handlers.len()
    }

    /// Delivers a value for the port's current mode.
    ///
    /// Values arriving before the hub reported the port's input format are dropped.
    pub fn dispatch_single(&self, port_id: u8, data: &[u8]) -> usize {
        match self.port_mode(port_id) {
            Some(mode) => self.dispatch(port_id, mode, data),
            None => {
                tracing::debug!("dropping value for port {port_id}: input format unknown");
                0
            }
        }
    }
}
