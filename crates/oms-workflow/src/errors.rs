//! Error types for the workflow layer

use oms_document::DocumentError;
use oms_types::{ProjectId, ProjectStatus, RoleTag, WorkflowId};
use thiserror::Error;

/// Errors that can occur in workflow operations
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("project status is '{status}' but this workflow requires one of: {}",
        .allowed.iter().map(|s| s.to_string()).collect::<Vec<_>>().join(", "))]
    ProjectNotEligible {
        status: ProjectStatus,
        allowed: &'static [ProjectStatus],
    },

    #[error("project {0} already has a pilot acceptance record")]
    AcceptanceExists(ProjectId),

    #[error("no workflow record found for id {0}")]
    RecordNotFound(WorkflowId),

    #[error("invalid workflow transition from '{from}' to '{to}' (valid: {})",
        .allowed.join(", "))]
    InvalidStatusTransition {
        from: &'static str,
        to: &'static str,
        allowed: Vec<&'static str>,
    },

    #[error("unknown checklist section '{section}' (legal sections: {})", .legal.join(", "))]
    UnknownChecklistSection {
        section: String,
        legal: &'static [&'static str],
    },

    #[error("unknown checklist item '{item}' (legal items: {})", .legal.join(", "))]
    UnknownChecklistItem {
        item: String,
        legal: &'static [&'static str],
    },

    #[error("checklist item '{item}' must be a boolean")]
    NonBooleanChecklistValue { item: String },

    #[error("unknown field '{field}' (legal fields: {})", .legal.join(", "))]
    UnknownField {
        field: String,
        legal: &'static [&'static str],
    },

    #[error("checklist is {completion}% complete; at least {required}% is required before review")]
    ChecklistIncomplete { completion: u8, required: u8 },

    #[error("change request must be impact assessed before a client decision")]
    NotReadyForClientDecision,

    #[error("impact assessment requiring additional effort must include an estimated time")]
    MissingEstimatedTime,

    #[error("impact assessment with additional cost must include an estimated cost")]
    MissingEstimatedCost,

    #[error("role '{role}' is not eligible to perform this action")]
    NotEligible { role: RoleTag },

    #[error("the '{slot}' signature slot is already signed")]
    AlreadySigned { slot: &'static str },

    #[error("handover must be ready for review, current status is '{status}'")]
    NotReviewable { status: &'static str },

    #[error(transparent)]
    Document(#[from] DocumentError),
}

/// Result type alias for workflow operations
pub type WorkflowResult<T> = Result<T, WorkflowError>;
