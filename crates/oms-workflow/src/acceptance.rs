//! Pilot acceptance workflow
//!
//! Client acceptance of a delivered pilot: a flat 12-item checklist, an
//! acceptance verdict set directly by the caller, and two-party signing
//! (school side and company side). At most one acceptance exists per
//! project; the [`crate::WorkflowStore`] enforces that cardinality.

use crate::{
    acceptance_completion, guard_project_status, record_signature, sections, signature_field,
    validate_acceptance_item, yes_no, SignatureEntry, SignatureScheme, WorkflowError,
    WorkflowResult, ACCEPTANCE_CHECKLIST_ITEMS,
};
use chrono::{DateTime, NaiveDate, Utc};
use oms_document::{DocumentEngine, DocumentInstance, GeneratedDocument, TemplateRegistry, TemplateType};
use oms_types::{Actor, Project, ProjectId, ProjectStatus, RoleTag, Timestamps, UserId, WorkflowId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Template rendered by [`PilotAcceptance::generate_certificate`].
pub const ACCEPTANCE_CERTIFICATE_TEMPLATE: &str = "Pilot Acceptance Certificate";

/// Projects far enough along for an acceptance record.
pub const ACCEPTANCE_ELIGIBLE_STATUSES: [ProjectStatus; 3] = [
    ProjectStatus::Testing,
    ProjectStatus::ClientReview,
    ProjectStatus::Completed,
];

/// Overall acceptance verdict. Set by the caller, never derived from the
/// checklist.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AcceptanceStatus {
    Accepted,
    AcceptedWithConditions,
    NotAccepted,
}

impl AcceptanceStatus {
    pub fn display_label(self) -> &'static str {
        match self {
            AcceptanceStatus::Accepted => "Accepted",
            AcceptanceStatus::AcceptedWithConditions => "Accepted with Conditions",
            AcceptanceStatus::NotAccepted => "Not Accepted",
        }
    }
}

/// Creation payload for a pilot acceptance.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CreateAcceptance {
    pub acceptance_status: AcceptanceStatus,
    pub completion_date: NaiveDate,
    pub token_payment: Option<f64>,
    pub issues_to_resolve: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PilotAcceptance {
    pub id: WorkflowId,
    pub project_id: ProjectId,
    pub acceptance_status: AcceptanceStatus,
    pub completion_date: NaiveDate,
    pub token_payment: Option<f64>,
    pub issues_to_resolve: String,
    pub school_representative_signed: bool,
    pub school_representative_signed_at: Option<DateTime<Utc>>,
    pub company_representative_signed: bool,
    pub company_representative_signed_at: Option<DateTime<Utc>>,
    pub created_by: UserId,
    pub document: DocumentInstance,
    pub timestamps: Timestamps,
}

impl PilotAcceptance {
    /// Create an acceptance record for a project in testing or later.
    ///
    /// Uniqueness per project is not checked here; create through the
    /// store to get it.
    pub fn create(
        project: &Project,
        request: CreateAcceptance,
        actor: &Actor,
        registry: &TemplateRegistry,
        engine: &DocumentEngine,
    ) -> WorkflowResult<Self> {
        guard_project_status(project, &ACCEPTANCE_ELIGIBLE_STATUSES)?;

        let template = crate::template_of_type(registry, TemplateType::Acceptance)?;
        let mut data = Map::new();
        data.insert(
            "school_name".into(),
            Value::String(project.client_name.clone()),
        );
        data.insert(
            "pilot_start_date".into(),
            Value::String(
                project
                    .start_date
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_default(),
            ),
        );
        data.insert(
            "completion_date".into(),
            Value::String(request.completion_date.format("%Y-%m-%d").to_string()),
        );
        data.insert(
            "acceptance_status".into(),
            Value::String(request.acceptance_status.display_label().to_string()),
        );
        data.insert(
            "issues_to_resolve".into(),
            Value::String(request.issues_to_resolve.clone()),
        );

        let generated =
            engine.generate(registry, &template.name, data, Some(actor), Some(project), None)?;
        let mut document = generated.instance;
        document.merge_section(sections::PROJECT_REFERENCE, crate::project_reference(project));
        document.merge_section(sections::CHECKLIST, Map::new());
        document.merge_section(sections::SIGNATURES, Map::new());

        let record = Self {
            id: WorkflowId::new(),
            project_id: project.id,
            acceptance_status: request.acceptance_status,
            completion_date: request.completion_date,
            token_payment: request.token_payment,
            issues_to_resolve: request.issues_to_resolve,
            school_representative_signed: false,
            school_representative_signed_at: None,
            company_representative_signed: false,
            company_representative_signed_at: None,
            created_by: actor.id,
            document,
            timestamps: Timestamps::now(),
        };

        tracing::info!(
            acceptance = %record.id,
            project = %project.project_code,
            verdict = record.acceptance_status.display_label(),
            "pilot acceptance created"
        );
        Ok(record)
    }

    /// Set one checklist item. Unknown keys and non-boolean values are
    /// rejected before any write.
    pub fn update_checklist_item(&mut self, item: &str, value: Value) -> WorkflowResult<()> {
        validate_acceptance_item(item, &value)?;
        let mut patch = Map::new();
        patch.insert(item.to_string(), value);
        self.document.merge_section(sections::CHECKLIST, patch);
        self.timestamps.touch();
        Ok(())
    }

    /// `round(completed / 12 * 100, 1)` over the full item set.
    pub fn completion_percentage(&self) -> f64 {
        acceptance_completion(&self.document.section(sections::CHECKLIST))
    }

    /// Change the verdict. Purely caller-driven.
    pub fn set_acceptance_status(&mut self, status: AcceptanceStatus) {
        self.acceptance_status = status;
        self.timestamps.touch();
    }

    pub fn can_sign(&self, actor: &Actor) -> bool {
        match actor.role {
            RoleTag::ClientContact => !self.school_representative_signed,
            RoleTag::Staff | RoleTag::Superadmin => !self.company_representative_signed,
        }
    }

    /// Sign into the role-resolved slot. Monotonic per slot.
    pub fn sign(&mut self, actor: &Actor, entry: SignatureEntry) -> WorkflowResult<&'static str> {
        let slot = SignatureScheme::SchoolCompany.resolve(actor.role)?;
        let now = Utc::now();
        if slot == crate::SCHOOL_REPRESENTATIVE {
            if self.school_representative_signed {
                return Err(WorkflowError::AlreadySigned { slot });
            }
            self.school_representative_signed = true;
            self.school_representative_signed_at = Some(now);
        } else {
            if self.company_representative_signed {
                return Err(WorkflowError::AlreadySigned { slot });
            }
            self.company_representative_signed = true;
            self.company_representative_signed_at = Some(now);
        }
        record_signature(&mut self.document, slot, &entry);
        self.timestamps.touch();
        tracing::info!(acceptance = %self.id, slot, signer = %actor.username, "pilot acceptance signed");
        Ok(slot)
    }

    pub fn is_fully_signed(&self) -> bool {
        self.school_representative_signed && self.company_representative_signed
    }

    /// Render the acceptance certificate. A fresh document instance is
    /// produced on every call.
    pub fn generate_certificate(
        &self,
        project: &Project,
        registry: &TemplateRegistry,
        engine: &DocumentEngine,
        actor: &Actor,
    ) -> WorkflowResult<GeneratedDocument> {
        let data = self.certificate_data(project);
        let signatures = self.document.section(sections::SIGNATURES);
        let generated = engine.generate(
            registry,
            ACCEPTANCE_CERTIFICATE_TEMPLATE,
            data,
            Some(actor),
            Some(project),
            Some(signatures),
        )?;
        Ok(generated)
    }

    fn certificate_data(&self, project: &Project) -> Map<String, Value> {
        let checklist = self.document.section(sections::CHECKLIST);

        let mut data = Map::new();
        let mut put = |key: &str, value: String| {
            data.insert(key.to_string(), Value::String(value));
        };

        put("school_name", project.client_name.clone());
        put(
            "pilot_start_date",
            project
                .start_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
        );
        put(
            "completion_date",
            self.completion_date.format("%Y-%m-%d").to_string(),
        );
        put(
            "token_payment",
            self.token_payment
                .map_or_else(|| "0".to_string(), |amount| format!("{amount:.2}")),
        );
        put(
            "acceptance_status",
            self.acceptance_status.display_label().to_string(),
        );
        put("issues_to_resolve", self.issues_to_resolve.clone());

        for item in ACCEPTANCE_CHECKLIST_ITEMS {
            put(item, yes_no(checklist.get(*item)).to_string());
        }

        for (slot, prefix) in [
            (crate::SCHOOL_REPRESENTATIVE, "school_representative"),
            (crate::COMPANY_REPRESENTATIVE, "company_rep"),
        ] {
            put(
                &format!("{prefix}_name"),
                signature_field(&self.document, slot, "name"),
            );
            put(
                &format!("{prefix}_title"),
                signature_field(&self.document, slot, "title"),
            );
            put(
                &format!("{prefix}_signed_date"),
                signature_field(&self.document, slot, "date"),
            );
        }

        put(
            "completion_percentage",
            format!("{}%", self.completion_percentage()),
        );
        data
    }
}
