//! Error types for the document pipeline

use crate::DocumentStatus;
use thiserror::Error;

/// Failure reported by a renderer implementation.
///
/// The engine wraps this with generation context before surfacing it;
/// renderer internals stay opaque to callers.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct RenderError {
    pub message: String,
}

impl RenderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Failure reported by an artifact store implementation.
#[derive(Debug, Error)]
#[error("artifact store: {message}")]
pub struct StoreError {
    pub message: String,
}

impl StoreError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Errors that can occur in document operations
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("published template not found: {0}")]
    TemplateNotFound(String),

    #[error("template already registered: {name} v{version}")]
    DuplicateTemplate { name: String, version: String },

    #[error("missing required fields for '{template}': {}", missing_fields.join(", "))]
    ValidationFailed {
        template: String,
        missing_fields: Vec<String>,
    },

    #[error("rendering '{template}' failed after {elapsed_ms}ms")]
    RenderFailed {
        template: String,
        elapsed_ms: u128,
        #[source]
        source: RenderError,
    },

    #[error("document cannot be signed (status: {status}, artifact: {has_artifact})")]
    NotSignable {
        status: DocumentStatus,
        has_artifact: bool,
    },

    #[error(transparent)]
    Storage(#[from] StoreError),
}

/// Result type alias for document operations
pub type DocumentResult<T> = Result<T, DocumentError>;
