//! Message envelope routed over the bus

use memorystore::now_timestamp;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Reserved message type that asks a component to leave its run loop
pub const SHUTDOWN: &str = "SHUTDOWN";

/// Shutdown target that matches every component
pub const BROADCAST_TARGET: &str = "all";

/// Source name stamped on envelopes emitted by the controller
pub const CONTROLLER_SOURCE: &str = "Controller";

/// Immutable envelope carried by the bus
///
/// Each emitter stamps its own clock read, so timestamps are not guaranteed
/// to be monotonic across components. The `id` only exists for log
/// correlation and takes no part in routing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    id: String,
    timestamp: f64,
    source: String,
    #[serde(rename = "message-type")]
    message_type: String,
    data: Value,
}

impl Message {
    /// Build an envelope stamped with the current time
    pub fn new(source: impl Into<String>, message_type: impl Into<String>, data: Value) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            timestamp: now_timestamp(),
            source: source.into(),
            message_type: message_type.into(),
            data,
        }
    }

    /// Build a SHUTDOWN envelope addressed to `target` (a component name or `"all"`)
    pub fn shutdown(source: impl Into<String>, target: &str) -> Self {
        Self::new(source, SHUTDOWN, serde_json::json!({ "target": target }))
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn timestamp(&self) -> f64 {
        self.timestamp
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn message_type(&self) -> &str {
        &self.message_type
    }

    pub fn data(&self) -> &Value {
        &self.data
    }

    /// The `target` field of the payload, when present and a string
    pub fn target(&self) -> Option<&str> {
        self.data.get("target").and_then(Value::as_str)
    }

    pub fn is_shutdown(&self) -> bool {
        self.message_type == SHUTDOWN
    }

    /// True for a SHUTDOWN addressed to `name` or broadcast to `"all"`
    pub fn is_shutdown_for(&self, name: &str) -> bool {
        self.is_shutdown() && matches!(self.target(), Some(target) if target == name || target == BROADCAST_TARGET)
    }
}
