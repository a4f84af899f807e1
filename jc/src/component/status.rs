//! Lifecycle state shared between a running component and its observers

use std::sync::atomic::{AtomicBool, Ordering};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard};

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Where a component is in its run loop
///
/// ```text
/// Created → Initializing → Running → Draining → Stopped
///                │            │
///                └────────────┴──→ Faulted
/// ```
///
/// `Stopped` and `Faulted` are terminal; nothing restarts a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComponentState {
    #[default]
    Created,
    Initializing,
    Running,
    Draining,
    Stopped,
    Faulted,
}

impl ComponentState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Stopped | Self::Faulted)
    }
}

impl std::fmt::Display for ComponentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::Initializing => write!(f, "initializing"),
            Self::Running => write!(f, "running"),
            Self::Draining => write!(f, "draining"),
            Self::Stopped => write!(f, "stopped"),
            Self::Faulted => write!(f, "faulted"),
        }
    }
}

struct StatusInner {
    name: String,
    running: AtomicBool,
    state: Mutex<ComponentState>,
}

/// Cloneable view of one component's `running` flag and lifecycle state
#[derive(Clone)]
pub struct ComponentStatus {
    inner: Arc<StatusInner>,
}

impl ComponentStatus {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(StatusInner {
                name: name.into(),
                running: AtomicBool::new(false),
                state: Mutex::new(ComponentState::Created),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// True between loop entry and loop exit
    pub fn is_running(&self) -> bool {
        self.inner.running.load(Ordering::SeqCst)
    }

    pub fn state(&self) -> ComponentState {
        *self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn set_running(&self, running: bool) {
        self.inner.running.store(running, Ordering::SeqCst);
    }

    pub(crate) fn set_state(&self, next: ComponentState) {
        let mut state = self.inner.state.lock().unwrap_or_else(PoisonError::into_inner);
        let from = *state;
        debug!(component = %self.inner.name, %from, to = %next, "state transition");
        *state = next;
    }
}

impl std::fmt::Debug for ComponentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentStatus")
            .field("name", &self.inner.name)
            .field("running", &self.is_running())
            .field("state", &self.state())
            .finish()
    }
}

/// Component name to status, shared by the controller, its handles and runners
pub(crate) type Registry = Arc<RwLock<BTreeMap<String, ComponentStatus>>>;

pub(crate) fn read_registry(registry: &Registry) -> RwLockReadGuard<'_, BTreeMap<String, ComponentStatus>> {
    registry.read().unwrap_or_else(PoisonError::into_inner)
}

/// Holds `running = true` for its lifetime
///
/// Dropping the guard clears the flag on every exit path, including panics
/// and task aborts. A guard dropped before a terminal state was recorded
/// marks the component `Faulted`.
pub(crate) struct RunningGuard {
    status: ComponentStatus,
}

impl RunningGuard {
    pub(crate) fn engage(status: &ComponentStatus) -> Self {
        status.set_running(true);
        status.set_state(ComponentState::Initializing);
        Self { status: status.clone() }
    }
}

impl Drop for RunningGuard {
    fn drop(&mut self) {
        if !self.status.state().is_terminal() {
            self.status.set_state(ComponentState::Faulted);
        }
        self.status.set_running(false);
    }
}
