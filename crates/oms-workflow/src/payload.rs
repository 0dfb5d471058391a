//! Payload layout shared by the workflow overlays
//!
//! Every overlay stores its structured state as sub-documents of its
//! document instance's `filled_data`. The top-level keys are a wire
//! contract: stored documents and downstream consumers address them by
//! name, so they must never be renamed.

use crate::{WorkflowError, WorkflowResult};
use oms_document::{DocumentError, DocumentTemplate, TemplateRegistry, TemplateType};
use oms_types::Project;
use serde_json::{Map, Value};

/// Top-level `filled_data` section keys.
pub mod sections {
    pub const CHANGE_REQUEST: &str = "change_request";
    pub const IMPACT_ASSESSMENT: &str = "impact_assessment";
    pub const CLIENT_DECISION: &str = "client_decision";
    pub const SIGNATURES: &str = "signatures";
    pub const PROJECT_REFERENCE: &str = "project_reference";
    pub const CHECKLIST: &str = "checklist";
    pub const HANDOVER_APPROVAL: &str = "handover_approval";
}

/// Render a stored boolean the way output documents expect it.
pub(crate) fn yes_no(value: Option<&Value>) -> &'static str {
    match value.and_then(Value::as_bool) {
        Some(true) => "Yes",
        _ => "No",
    }
}

/// Render an optional scalar as plain text, empty when absent.
pub(crate) fn text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

/// The `project_reference` sub-document written at creation time.
pub(crate) fn project_reference(project: &Project) -> Map<String, Value> {
    let mut reference = Map::new();
    reference.insert(
        "project_title".into(),
        Value::String(project.project_name.clone()),
    );
    reference.insert(
        "project_code".into(),
        Value::String(project.project_code.clone()),
    );
    reference.insert(
        "client_name".into(),
        Value::String(project.client_name.clone()),
    );
    reference
}

/// Resolve the published template an overlay creates its document from.
/// Highest published version of the type wins.
pub(crate) fn template_of_type(
    registry: &TemplateRegistry,
    template_type: TemplateType,
) -> WorkflowResult<&DocumentTemplate> {
    registry
        .published_of_type(template_type)
        .into_iter()
        .max_by(|a, b| a.version.cmp(&b.version))
        .ok_or(WorkflowError::Document(DocumentError::TemplateNotFound(
            template_type.to_string(),
        )))
}
