//! Component abstraction and run loop
//!
//! A component implements [`Component`] (`initialize` + `process_message`).
//! The [`ComponentRunner`] owns it while it runs:
//!
//! 1. `running = true`, state `Initializing`
//! 2. `initialize()`; failure ends the loop as `Faulted` with [`ComponentError::Init`]
//! 3. state `Running`; dequeue, skip or stop on SHUTDOWN, else `process_message()`
//! 4. own SHUTDOWN (or `"all"`): `Draining`, then `Stopped`
//! 5. any error: `Faulted`, error returned to whoever joins the task
//!
//! `running` is reset on every exit path.

mod error;
mod runner;
mod status;
mod traits;

pub use error::ComponentError;
pub use runner::{ComponentRunner, ForeignShutdownPolicy};
pub use status::{ComponentState, ComponentStatus};
pub(crate) use status::{Registry, read_registry};
pub use traits::{Component, ComponentContext};
