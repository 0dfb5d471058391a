//! Error types for the lifecycle layer

use oms_types::ProjectStatus;
use thiserror::Error;

/// Errors that can occur in lifecycle operations
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("invalid status transition from '{from}' to '{to}' (valid: {})",
        .allowed.iter().map(|s| s.to_string()).collect::<Vec<_>>().join(", "))]
    InvalidTransition {
        from: ProjectStatus,
        to: ProjectStatus,
        allowed: &'static [ProjectStatus],
    },
}

/// Result type alias for lifecycle operations
pub type LifecycleResult<T> = Result<T, LifecycleError>;
