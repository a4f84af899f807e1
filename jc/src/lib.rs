//! JarvisCore - components over a shared message bus
//!
//! Independent components run as tokio tasks and communicate only through a
//! single FIFO [`MessageBus`]. A [`Controller`] registers them, starts them
//! concurrently and stops them with SHUTDOWN envelopes. Interactions persist
//! in the SQLite-backed [`MemoryStore`].
//!
//! # Modules
//!
//! - [`bus`] - message envelope and the shared queue
//! - [`component`] - component trait, run loop and lifecycle state
//! - [`controller`] - registry, startup and shutdown
//! - [`components`] - builtin recorder and heartbeat
//! - [`config`] - configuration types and loading
//! - [`cli`] - command-line interface

pub mod bus;
pub mod cli;
pub mod component;
pub mod components;
pub mod config;
pub mod controller;

// Re-export commonly used types
pub use bus::{BROADCAST_TARGET, BusError, BusMetrics, CONTROLLER_SOURCE, Message, MessageBus, SHUTDOWN};
pub use component::{
    Component, ComponentContext, ComponentError, ComponentRunner, ComponentState, ComponentStatus,
    ForeignShutdownPolicy,
};
pub use config::{ComponentsConfig, Config, MemoryConfig};
pub use controller::{
    ComponentOutcome, Controller, ControllerConfig, ControllerError, ControllerHandle, RUN_INTERACTION, RunReport,
};
pub use memorystore::{Interaction, MemoryStore};
