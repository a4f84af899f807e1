//! Component error types

use thiserror::Error;

/// Errors that end a component's run loop
#[derive(Debug, Clone, Error)]
pub enum ComponentError {
    #[error("Component {component} failed to initialize: {reason}")]
    Init { component: String, reason: String },

    #[error("Component {component} failed processing '{message_type}': {reason}")]
    Processing {
        component: String,
        message_type: String,
        reason: String,
    },

    #[error("Component {component} lost its message bus (closed)")]
    BusClosed { component: String },

    #[error("Component {component} panicked: {reason}")]
    Panicked { component: String, reason: String },

    #[error("Component {component} task was cancelled")]
    Cancelled { component: String },
}

impl ComponentError {
    /// Name of the component that failed
    pub fn component(&self) -> &str {
        match self {
            Self::Init { component, .. }
            | Self::Processing { component, .. }
            | Self::BusClosed { component }
            | Self::Panicked { component, .. }
            | Self::Cancelled { component } => component,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_processing_message_names_component_and_type() {
        let err = ComponentError::Processing {
            component: "speech".to_string(),
            message_type: "TRANSCRIBE".to_string(),
            reason: "device busy".to_string(),
        };

        let msg = err.to_string();
        assert!(msg.contains("speech"));
        assert!(msg.contains("TRANSCRIBE"));
        assert!(msg.contains("device busy"));
        assert_eq!(err.component(), "speech");
    }

    #[test]
    fn test_component_accessor_covers_all_variants() {
        let errs = [
            ComponentError::Init {
                component: "a".to_string(),
                reason: "x".to_string(),
            },
            ComponentError::BusClosed {
                component: "a".to_string(),
            },
            ComponentError::Panicked {
                component: "a".to_string(),
                reason: "boom".to_string(),
            },
            ComponentError::Cancelled {
                component: "a".to_string(),
            },
        ];
        assert!(errs.iter().all(|e| e.component() == "a"));
    }
}
