//! Main Controller implementation

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, PoisonError, RwLock};

use memorystore::MemoryStore;
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, info, warn};

use crate::bus::MessageBus;
use crate::component::{Component, ComponentError, ComponentRunner, ComponentStatus, Registry, read_registry};

use super::config::ControllerConfig;
use super::handle::ControllerHandle;
use super::report::{ComponentOutcome, ControllerError, RunReport};

/// Interaction type recorded after every run
pub const RUN_INTERACTION: &str = "controller_run";

/// Owns the component registry and the shared bus
pub struct Controller {
    config: ControllerConfig,
    bus: MessageBus,
    registry: Registry,
    /// Registered components not yet launched by `start`
    pending: HashMap<String, ComponentRunner>,
    memory: Arc<MemoryStore>,
}

impl Controller {
    /// Create a controller with a fresh bus
    pub fn new(config: ControllerConfig, memory: Arc<MemoryStore>) -> Self {
        debug!(?config, memory = %memory.location(), "Controller::new: called");
        Self {
            config,
            bus: MessageBus::new(),
            registry: Arc::new(RwLock::new(BTreeMap::new())),
            pending: HashMap::new(),
            memory,
        }
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn bus(&self) -> &MessageBus {
        &self.bus
    }

    pub fn memory(&self) -> &Arc<MemoryStore> {
        &self.memory
    }

    /// Handle usable while `start` is running
    pub fn handle(&self) -> ControllerHandle {
        ControllerHandle::new(self.bus.clone(), self.registry.clone())
    }

    /// Register a component under its name
    ///
    /// A second component with the same name silently replaces the first.
    pub fn register<C: Component>(&mut self, component: C) {
        self.register_boxed(Box::new(component));
    }

    pub fn register_boxed(&mut self, component: Box<dyn Component>) {
        let runner = ComponentRunner::new(component, self.bus.clone(), self.config.foreign_shutdown)
            .with_peers(self.registry.clone());
        let name = runner.name().to_string();

        let replaced = self
            .registry
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.clone(), runner.status())
            .is_some();
        self.pending.insert(name.clone(), runner);

        if replaced {
            warn!(component = %name, "Component already registered, replacing previous entry");
        } else {
            info!("Registered component: {}", name);
        }
    }

    /// Registered component names, sorted
    pub fn component_names(&self) -> Vec<String> {
        read_registry(&self.registry).keys().cloned().collect()
    }

    pub fn status(&self, name: &str) -> Option<ComponentStatus> {
        read_registry(&self.registry).get(name).cloned()
    }

    /// Launch every registered component and wait for all of them to finish
    ///
    /// Each component runs in its own task. A faulted component does not
    /// cancel its siblings; failures are collected and reported once every
    /// task has reached a terminal state.
    pub async fn start(&mut self) -> Result<RunReport, ControllerError> {
        let runners: Vec<(String, ComponentRunner)> = self.pending.drain().collect();
        info!(count = runners.len(), "Starting components");

        let (names, tasks): (Vec<String>, Vec<JoinHandle<Result<(), ComponentError>>>) = runners
            .into_iter()
            .map(|(name, runner)| (name, tokio::spawn(runner.run())))
            .unzip();

        let results = futures::future::join_all(tasks).await;

        let mut report = RunReport::default();
        for (name, result) in names.into_iter().zip(results) {
            let outcome = match result {
                Ok(Ok(())) => ComponentOutcome::Stopped,
                Ok(Err(err)) => ComponentOutcome::Faulted(err),
                Err(join_err) => ComponentOutcome::Faulted(join_failure(name.clone(), join_err)),
            };
            report.record(name, outcome);
        }

        record_run(self.memory.clone(), &report).await;

        if report.is_clean() {
            info!(stopped = report.outcomes.len(), "All components stopped");
            Ok(report)
        } else {
            let failed = report.faulted();
            warn!(?failed, "Components faulted");
            Err(ControllerError::ComponentsFaulted { failed, report })
        }
    }

    /// Enqueue one SHUTDOWN per registered component; does not wait
    pub fn shutdown(&self) -> Result<usize, ControllerError> {
        Ok(self.handle().shutdown()?)
    }

    /// Enqueue one `"all"` SHUTDOWN per live component
    pub fn shutdown_all(&self) -> Result<usize, ControllerError> {
        Ok(self.handle().shutdown_all()?)
    }
}

/// Append a `controller_run` interaction summarising the report
///
/// Persistence failures are logged and otherwise ignored.
async fn record_run(memory: Arc<MemoryStore>, report: &RunReport) {
    if report.outcomes.is_empty() {
        return;
    }

    let summary = report.to_json();
    match tokio::task::spawn_blocking(move || memory.store_interaction(RUN_INTERACTION, &summary, None)).await {
        Ok(Ok(())) => debug!("Recorded controller run"),
        Ok(Err(e)) => warn!(error = %e, "Failed to record controller run"),
        Err(e) => warn!(error = %e, "Run recording task failed"),
    }
}

fn join_failure(component: String, err: JoinError) -> ComponentError {
    if !err.is_panic() {
        return ComponentError::Cancelled { component };
    }

    let payload = err.into_panic();
    let reason = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic payload".to_string());
    ComponentError::Panicked { component, reason }
}
