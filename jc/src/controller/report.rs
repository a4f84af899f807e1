//! Outcome of a controller run

use std::collections::BTreeMap;

use serde_json::{Value, json};
use thiserror::Error;

use crate::bus::BusError;
use crate::component::ComponentError;

/// How one component's run loop ended
#[derive(Debug, Clone)]
pub enum ComponentOutcome {
    /// Left the loop on its own SHUTDOWN
    Stopped,
    /// Ended with an error
    Faulted(ComponentError),
}

impl ComponentOutcome {
    pub fn is_faulted(&self) -> bool {
        matches!(self, Self::Faulted(_))
    }
}

/// Terminal outcome of every component launched by one `start()`
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub outcomes: BTreeMap<String, ComponentOutcome>,
}

impl RunReport {
    pub(crate) fn record(&mut self, name: String, outcome: ComponentOutcome) {
        self.outcomes.insert(name, outcome);
    }

    /// Names of components that stopped cleanly
    pub fn stopped(&self) -> Vec<String> {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| !outcome.is_faulted())
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Names of components that faulted
    pub fn faulted(&self) -> Vec<String> {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| outcome.is_faulted())
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// The error a component faulted with, if any
    pub fn error(&self, name: &str) -> Option<&ComponentError> {
        match self.outcomes.get(name) {
            Some(ComponentOutcome::Faulted(err)) => Some(err),
            _ => None,
        }
    }

    pub fn is_clean(&self) -> bool {
        self.outcomes.values().all(|outcome| !outcome.is_faulted())
    }

    /// JSON summary used for the `controller_run` interaction
    pub fn to_json(&self) -> Value {
        let faulted: serde_json::Map<String, Value> = self
            .outcomes
            .iter()
            .filter_map(|(name, outcome)| match outcome {
                ComponentOutcome::Faulted(err) => Some((name.clone(), Value::String(err.to_string()))),
                ComponentOutcome::Stopped => None,
            })
            .collect();

        json!({
            "stopped": self.stopped(),
            "faulted": faulted,
        })
    }
}

/// Errors surfaced by the controller
#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("{} component(s) faulted: {}", .failed.len(), .failed.join(", "))]
    ComponentsFaulted { failed: Vec<String>, report: RunReport },

    #[error("Bus error: {0}")]
    Bus(#[from] BusError),
}

impl ControllerError {
    /// The run report, when the error came from a completed run
    pub fn report(&self) -> Option<&RunReport> {
        match self {
            Self::ComponentsFaulted { report, .. } => Some(report),
            Self::Bus(_) => None,
        }
    }
}
