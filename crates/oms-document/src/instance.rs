//! Generated document instances

use crate::{DocumentError, DocumentResult, TemplateType};
use chrono::{DateTime, Utc};
use oms_types::{Actor, DocumentId, ProjectId, TemplateId, Timestamps, UserId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Document instance lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentStatus {
    Generated,
    Signed,
    Archived,
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DocumentStatus::Generated => "GENERATED",
            DocumentStatus::Signed => "SIGNED",
            DocumentStatus::Archived => "ARCHIVED",
        };
        f.write_str(s)
    }
}

/// Reference to a stored rendered artifact.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactRef {
    pub path: String,
    pub size_bytes: usize,
}

/// One concrete generated document.
///
/// `filled_data` is an open-ended JSON object; its top-level keys are
/// defined by the owning workflow, not by the instance itself. All payload
/// writes go through [`DocumentInstance::merge_section`], which touches only
/// the named section and bumps `revision` so a storage layer can detect
/// stale concurrent writes.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DocumentInstance {
    pub id: DocumentId,
    pub template_id: TemplateId,
    pub template_name: String,
    pub template_type: TemplateType,
    pub project_id: Option<ProjectId>,
    pub filled_data: Map<String, Value>,
    pub artifact: Option<ArtifactRef>,
    pub document_title: String,
    /// Type-tagged reference, e.g. `CHANGE-20260829-101500`.
    pub document_number: String,
    pub status: DocumentStatus,
    pub signed_by: Option<UserId>,
    pub signed_at: Option<DateTime<Utc>>,
    /// `None` means the system identity generated the document.
    pub created_by: Option<UserId>,
    /// Incremented on every payload write.
    pub revision: u64,
    pub timestamps: Timestamps,
}

impl DocumentInstance {
    pub fn is_signed(&self) -> bool {
        self.status == DocumentStatus::Signed && self.signed_by.is_some()
    }

    /// A document can only be signed while `GENERATED` and with a rendered
    /// artifact on record.
    pub fn can_be_signed(&self) -> bool {
        self.status == DocumentStatus::Generated && self.artifact.is_some()
    }

    /// Mark the instance signed by `actor`.
    pub fn sign(&mut self, actor: &Actor) -> DocumentResult<()> {
        if !self.can_be_signed() {
            return Err(DocumentError::NotSignable {
                status: self.status,
                has_artifact: self.artifact.is_some(),
            });
        }
        self.status = DocumentStatus::Signed;
        self.signed_by = Some(actor.id);
        self.signed_at = Some(Utc::now());
        self.timestamps.touch();
        Ok(())
    }

    /// Merge `patch` into `filled_data[section]`, key by key.
    ///
    /// Sibling keys inside the section and sibling sections are left
    /// untouched; the revision counter is bumped once per call.
    pub fn merge_section(&mut self, section: &str, patch: Map<String, Value>) {
        let entry = self
            .filled_data
            .entry(section.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        if let Some(target) = entry.as_object_mut() {
            for (key, value) in patch {
                target.insert(key, value);
            }
        }
        self.revision += 1;
        self.timestamps.touch();
    }

    /// Read a payload section as an object, empty if absent.
    pub fn section(&self, section: &str) -> Map<String, Value> {
        self.filled_data
            .get(section)
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default()
    }

    pub fn artifact_size(&self) -> usize {
        self.artifact.as_ref().map_or(0, |a| a.size_bytes)
    }
}
