//! Signature bookkeeping shared by the workflow overlays
//!
//! Signatures live in two places at once: monotonic flags on the workflow
//! record (who has signed, when) and a structured entry under the
//! `signatures` payload section (what the rendered document shows). The
//! slot an actor signs into is resolved from their role, never chosen by
//! the caller.

use crate::{sections, WorkflowError, WorkflowResult};
use chrono::{DateTime, Utc};
use oms_document::DocumentInstance;
use oms_types::RoleTag;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const CLIENT_REPRESENTATIVE: &str = "client_representative";
pub const PROVIDER_REPRESENTATIVE: &str = "provider_representative";
pub const SCHOOL_REPRESENTATIVE: &str = "school_representative";
pub const COMPANY_REPRESENTATIVE: &str = "company_representative";
pub const TEAM_LEAD: &str = "team_lead";

/// One party's signature as recorded in the payload.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SignatureEntry {
    pub name: String,
    pub title: String,
    /// Reference to the captured signature image, empty when signed by name only.
    pub signature: String,
    pub date: DateTime<Utc>,
}

impl SignatureEntry {
    pub fn new(name: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            signature: String::new(),
            date: Utc::now(),
        }
    }

    pub fn with_signature(mut self, reference: impl Into<String>) -> Self {
        self.signature = reference.into();
        self
    }

    pub(crate) fn to_value(&self) -> Value {
        let mut entry = Map::new();
        entry.insert("name".into(), Value::String(self.name.clone()));
        entry.insert("title".into(), Value::String(self.title.clone()));
        entry.insert("signature".into(), Value::String(self.signature.clone()));
        entry.insert("date".into(), Value::String(self.date.to_rfc3339()));
        Value::Object(entry)
    }
}

/// How a workflow maps signer roles to signature slots.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SignatureScheme {
    /// Change requests: client contact vs. provider staff.
    ClientProvider,
    /// Pilot acceptance: school side vs. company side.
    SchoolCompany,
    /// Pilot handover: internal sign-off, staff only.
    TeamLeadOnly,
}

impl SignatureScheme {
    /// Slot an actor's role signs into. `None` means the role cannot sign
    /// under this scheme at all.
    pub fn slot_for(self, role: RoleTag) -> Option<&'static str> {
        match (self, role) {
            (SignatureScheme::ClientProvider, RoleTag::ClientContact) => {
                Some(CLIENT_REPRESENTATIVE)
            }
            (SignatureScheme::ClientProvider, _) => Some(PROVIDER_REPRESENTATIVE),
            (SignatureScheme::SchoolCompany, RoleTag::ClientContact) => {
                Some(SCHOOL_REPRESENTATIVE)
            }
            (SignatureScheme::SchoolCompany, _) => Some(COMPANY_REPRESENTATIVE),
            (SignatureScheme::TeamLeadOnly, RoleTag::ClientContact) => None,
            (SignatureScheme::TeamLeadOnly, _) => Some(TEAM_LEAD),
        }
    }

    /// Resolve the slot or fail with the actor's role.
    pub(crate) fn resolve(self, role: RoleTag) -> WorkflowResult<&'static str> {
        self.slot_for(role)
            .ok_or(WorkflowError::NotEligible { role })
    }
}

/// Write `entry` into the `signatures` section under `slot`, preserving
/// any other party's entry.
pub(crate) fn record_signature(
    document: &mut DocumentInstance,
    slot: &'static str,
    entry: &SignatureEntry,
) {
    let mut patch = Map::new();
    patch.insert(slot.to_string(), entry.to_value());
    document.merge_section(sections::SIGNATURES, patch);
}

/// Read one field of a recorded signature, empty if never signed.
pub(crate) fn signature_field(document: &DocumentInstance, slot: &str, field: &str) -> String {
    document
        .section(sections::SIGNATURES)
        .get(slot)
        .and_then(Value::as_object)
        .and_then(|entry| entry.get(field))
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_default()
}
