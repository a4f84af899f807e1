//! Component trait and the context handed to every component

use async_trait::async_trait;
use eyre::Result;
use serde_json::Value;
use tracing::debug;

use crate::bus::{BusError, Message, MessageBus};

/// An independently scheduled worker attached to the shared bus
///
/// The run loop (see [`ComponentRunner`](super::ComponentRunner)) calls
/// `initialize` once, then `process_message` for every envelope it dequeues
/// that is not its own SHUTDOWN. Neither call is bounded by a timeout; a
/// component that may stall must bound its own work.
#[async_trait]
pub trait Component: Send + 'static {
    /// Unique name used for registry lookup and shutdown targeting
    fn name(&self) -> &str;

    /// One-time setup before the loop starts
    ///
    /// `Ok(false)` and `Err` are both fatal to this component only.
    async fn initialize(&mut self, ctx: &ComponentContext) -> Result<bool>;

    /// Handle one dequeued envelope
    ///
    /// The bus is shared, so this receives messages meant for other
    /// components too; filter on `message_type` and the payload's target.
    async fn process_message(&mut self, message: Message, ctx: &ComponentContext) -> Result<()>;
}

/// A component's view of the bus, bound to its name
#[derive(Clone)]
pub struct ComponentContext {
    name: String,
    bus: MessageBus,
}

impl ComponentContext {
    pub fn new(name: impl Into<String>, bus: MessageBus) -> Self {
        Self { name: name.into(), bus }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bus(&self) -> &MessageBus {
        &self.bus
    }

    /// Stamp a new envelope with this component's name and the current time
    /// and put it on the bus
    pub fn emit(&self, message_type: &str, data: Value) -> Result<(), BusError> {
        debug!(component = %self.name, %message_type, "ComponentContext::emit: called");
        self.bus.enqueue(Message::new(self.name.clone(), message_type, data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_emit_stamps_source() {
        let bus = MessageBus::new();
        let ctx = ComponentContext::new("A", bus.clone());

        ctx.emit("PING", json!({"n": 1})).unwrap();

        let msg = bus.dequeue().await.unwrap();
        assert_eq!(msg.source(), "A");
        assert_eq!(msg.message_type(), "PING");
        assert_eq!(msg.data(), &json!({"n": 1}));
    }

    #[tokio::test]
    async fn test_emit_on_closed_bus_fails() {
        let bus = MessageBus::new();
        let ctx = ComponentContext::new("A", bus.clone());
        bus.close();

        assert_eq!(ctx.emit("PING", json!({})).unwrap_err(), BusError::Closed);
    }
}
