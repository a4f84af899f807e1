//! Message bus and envelope
//!
//! ```text
//!   Controller ──┐                      ┌──> Component A (dequeue)
//!   Component A ─┼──> [ MessageBus ] ───┼──> Component B (dequeue)
//!   Component B ─┘   one FIFO queue     └──> ...
//! ```
//!
//! The bus is a single queue, not a set of mailboxes. Any consumer may take
//! any message, so routing is a convention enforced by components inspecting
//! `message_type` and the payload's `target`.

mod message;
mod queue;

pub use message::{BROADCAST_TARGET, CONTROLLER_SOURCE, Message, SHUTDOWN};
pub use queue::{BusError, BusMetrics, MessageBus};
