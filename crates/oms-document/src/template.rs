//! Document templates: versioned blueprints for generated documents

use oms_types::{TemplateId, Timestamps, UserId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// What kind of document a template generates.
///
/// The wire form is SCREAMING_SNAKE_CASE; document numbers embed it
/// verbatim (`CHANGE-20260829-101500`), so the names are frozen.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TemplateType {
    Intake,
    Acceptance,
    Change,
    Handover,
    Legal,
}

impl fmt::Display for TemplateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TemplateType::Intake => "INTAKE",
            TemplateType::Acceptance => "ACCEPTANCE",
            TemplateType::Change => "CHANGE",
            TemplateType::Handover => "HANDOVER",
            TemplateType::Legal => "LEGAL",
        };
        f.write_str(s)
    }
}

/// Template lifecycle. Only published templates are usable for generation;
/// a published template is immutable in practice — new versions are new rows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TemplateStatus {
    Draft,
    Published,
    Archived,
}

/// Outcome of validating data against a template's required fields.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Validation {
    pub is_valid: bool,
    pub missing_fields: Vec<String>,
}

/// A named, versioned document blueprint.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DocumentTemplate {
    pub id: TemplateId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub template_type: TemplateType,
    /// Renderable body handed to the renderer together with the context.
    pub content: String,
    pub version: String,
    pub status: TemplateStatus,
    /// Field names that must be present (and non-empty) in generation data.
    pub required_fields: Vec<String>,
    /// Informational only; never enforced.
    pub optional_fields: Vec<String>,
    pub created_by: Option<UserId>,
    pub timestamps: Timestamps,
}

impl DocumentTemplate {
    pub fn new(
        name: impl Into<String>,
        template_type: TemplateType,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: TemplateId::new(),
            name: name.into(),
            description: String::new(),
            template_type,
            content: content.into(),
            version: "1.0".to_string(),
            status: TemplateStatus::Draft,
            required_fields: Vec::new(),
            optional_fields: Vec::new(),
            created_by: None,
            timestamps: Timestamps::now(),
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_required_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_optional_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.optional_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn published(mut self) -> Self {
        self.status = TemplateStatus::Published;
        self
    }

    pub fn is_published(&self) -> bool {
        self.status == TemplateStatus::Published
    }

    /// Validate that `data` carries every required field with a non-empty
    /// value. A field counts as missing when absent or when its value is
    /// empty (`null`, `""`, `false`, `0`, `[]`, `{}`).
    pub fn validate_data(&self, data: &Map<String, Value>) -> Validation {
        let missing_fields: Vec<String> = self
            .required_fields
            .iter()
            .filter(|field| data.get(*field).map_or(true, value_is_empty))
            .cloned()
            .collect();
        Validation {
            is_valid: missing_fields.is_empty(),
            missing_fields,
        }
    }
}

fn value_is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}
