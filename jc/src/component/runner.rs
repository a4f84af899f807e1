//! ComponentRunner - the run loop every component executes
//!
//! The runner owns the component, binds it to the bus and drives the
//! lifecycle state machine. The `running` flag is held by a drop guard so it
//! is cleared however the loop exits.

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::bus::{BusError, MessageBus};

use super::error::ComponentError;
use super::status::{ComponentState, ComponentStatus, Registry, RunningGuard, read_registry};
use super::traits::{Component, ComponentContext};

/// What a component does with a SHUTDOWN addressed to somebody else
///
/// A foreign SHUTDOWN never terminates the component that dequeued it.
/// Under `Requeue` it only goes back on the bus while its target is
/// registered and not yet terminal; otherwise it is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ForeignShutdownPolicy {
    /// Put it back at the tail of the bus and yield, so a live target can pick it up
    #[default]
    Requeue,
    /// Hand it to `process_message` like any other message
    Deliver,
}

/// Drives one component through its lifecycle
pub struct ComponentRunner {
    component: Box<dyn Component>,
    ctx: ComponentContext,
    status: ComponentStatus,
    foreign_shutdown: ForeignShutdownPolicy,
    /// Statuses of the other components on the bus
    peers: Option<Registry>,
}

impl ComponentRunner {
    pub fn new(component: Box<dyn Component>, bus: MessageBus, foreign_shutdown: ForeignShutdownPolicy) -> Self {
        let name = component.name().to_string();
        debug!(component = %name, ?foreign_shutdown, "ComponentRunner::new: called");
        Self {
            ctx: ComponentContext::new(name.clone(), bus),
            status: ComponentStatus::new(name),
            component,
            foreign_shutdown,
            peers: None,
        }
    }

    /// Let the runner see which shutdown targets are still alive
    pub(crate) fn with_peers(mut self, peers: Registry) -> Self {
        self.peers = Some(peers);
        self
    }

    pub fn name(&self) -> &str {
        self.ctx.name()
    }

    /// Shared status handle; stays valid after `run` consumes the runner
    pub fn status(&self) -> ComponentStatus {
        self.status.clone()
    }

    /// Run the component until its SHUTDOWN arrives or it fails
    pub async fn run(mut self) -> Result<(), ComponentError> {
        let _running = RunningGuard::engage(&self.status);
        let name = self.ctx.name().to_string();
        info!(component = %name, "Component starting");

        match self.component.initialize(&self.ctx).await {
            Ok(true) => {}
            Ok(false) => {
                return Err(self.fault(ComponentError::Init {
                    component: name,
                    reason: "initialize returned false".to_string(),
                }));
            }
            Err(e) => {
                return Err(self.fault(ComponentError::Init {
                    component: name,
                    reason: format!("{:#}", e),
                }));
            }
        }

        self.status.set_state(ComponentState::Running);
        debug!(component = %name, "Component initialized");

        loop {
            let message = match self.ctx.bus().dequeue().await {
                Ok(message) => message,
                Err(BusError::Closed) => return Err(self.fault(ComponentError::BusClosed { component: name })),
            };

            if message.is_shutdown_for(&name) {
                debug!(component = %name, source = %message.source(), "Shutdown received");
                self.status.set_state(ComponentState::Draining);
                break;
            }

            if message.is_shutdown() && self.foreign_shutdown == ForeignShutdownPolicy::Requeue {
                if !self.is_live(message.target()) {
                    debug!(
                        component = %name,
                        target = ?message.target(),
                        "Dropping shutdown for a component that is not running"
                    );
                    continue;
                }
                debug!(
                    component = %name,
                    target = ?message.target(),
                    "Requeueing shutdown for another component"
                );
                if self.ctx.bus().enqueue(message).is_err() {
                    return Err(self.fault(ComponentError::BusClosed { component: name }));
                }
                tokio::task::yield_now().await;
                continue;
            }

            let message_type = message.message_type().to_string();
            if let Err(e) = self.component.process_message(message, &self.ctx).await {
                error!(component = %name, %message_type, error = %e, "Error in component");
                return Err(self.fault(ComponentError::Processing {
                    component: name,
                    message_type,
                    reason: format!("{:#}", e),
                }));
            }
        }

        self.status.set_state(ComponentState::Stopped);
        info!(component = %name, "Component stopped");
        Ok(())
    }

    /// True when `target` is registered and has not reached a terminal state
    fn is_live(&self, target: Option<&str>) -> bool {
        let (Some(target), Some(peers)) = (target, &self.peers) else {
            return false;
        };
        read_registry(peers)
            .get(target)
            .is_some_and(|status| !status.state().is_terminal())
    }

    fn fault(&self, err: ComponentError) -> ComponentError {
        warn!(component = %self.ctx.name(), error = %err, "Component faulted");
        self.status.set_state(ComponentState::Faulted);
        err
    }
}
