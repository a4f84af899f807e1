//! Controller: registry, shared bus, startup and shutdown
//!
//! - **register**: add a component by name (last registration wins)
//! - **start**: run every component concurrently, join all, report outcomes
//! - **shutdown**: enqueue a targeted SHUTDOWN per component, fire-and-forget

mod config;
mod core;
mod handle;
mod report;

pub use config::ControllerConfig;
pub use core::{Controller, RUN_INTERACTION};
pub use handle::ControllerHandle;
pub use report::{ComponentOutcome, ControllerError, RunReport};
