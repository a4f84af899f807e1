//! ControllerHandle - cloneable shutdown/status interface
//!
//! `Controller::start` holds the controller mutably until every component
//! finishes, so signal handlers and other tasks talk to it through a handle.

use tracing::{debug, info};

use crate::bus::{BROADCAST_TARGET, BusError, CONTROLLER_SOURCE, Message, MessageBus};
use crate::component::{ComponentStatus, Registry, read_registry};

/// Handle for requesting shutdown and observing components
#[derive(Clone)]
pub struct ControllerHandle {
    bus: MessageBus,
    registry: Registry,
}

impl ControllerHandle {
    pub(crate) fn new(bus: MessageBus, registry: Registry) -> Self {
        debug!("ControllerHandle::new: called");
        Self { bus, registry }
    }

    pub fn bus(&self) -> &MessageBus {
        &self.bus
    }

    /// Registered component names, sorted
    pub fn component_names(&self) -> Vec<String> {
        read_registry(&self.registry).keys().cloned().collect()
    }

    pub fn status(&self, name: &str) -> Option<ComponentStatus> {
        read_registry(&self.registry).get(name).cloned()
    }

    /// Enqueue one SHUTDOWN per registered component, targeted by name
    ///
    /// Fire-and-forget: returns once the envelopes are on the bus, not when
    /// components have stopped. Returns the number of envelopes sent.
    pub fn shutdown(&self) -> Result<usize, BusError> {
        let names = self.component_names();
        info!(count = names.len(), "Broadcasting shutdown to components");

        for name in &names {
            self.bus.enqueue(Message::shutdown(CONTROLLER_SOURCE, name))?;
        }
        Ok(names.len())
    }

    /// Enqueue one `"all"` SHUTDOWN per component that has not yet terminated
    ///
    /// Each envelope is consumed by exactly one component, so one is sent for
    /// every live component.
    pub fn shutdown_all(&self) -> Result<usize, BusError> {
        let live = read_registry(&self.registry)
            .values()
            .filter(|status| !status.state().is_terminal())
            .count();
        info!(count = live, "Broadcasting shutdown to all live components");

        for _ in 0..live {
            self.bus.enqueue(Message::shutdown(CONTROLLER_SOURCE, BROADCAST_TARGET))?;
        }
        Ok(live)
    }
}
