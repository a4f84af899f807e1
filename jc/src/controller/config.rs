//! Controller configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::component::ForeignShutdownPolicy;

/// Controller configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// What a component does with a SHUTDOWN meant for another component
    #[serde(rename = "foreign-shutdown", default)]
    pub foreign_shutdown: ForeignShutdownPolicy,

    /// How long the entry point waits for components after requesting shutdown
    #[serde(rename = "shutdown-timeout-secs", default = "default_shutdown_timeout_secs")]
    pub shutdown_timeout_secs: u64,
}

fn default_shutdown_timeout_secs() -> u64 {
    debug!("default_shutdown_timeout_secs: called");
    10
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            foreign_shutdown: ForeignShutdownPolicy::default(),
            shutdown_timeout_secs: default_shutdown_timeout_secs(),
        }
    }
}

impl ControllerConfig {
    /// Shutdown grace period as a Duration
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}
