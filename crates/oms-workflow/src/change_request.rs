//! Change request workflow
//!
//! Formal change authorization during an active project: a nine-state
//! machine with a staff-gated impact assessment, a client decision that is
//! recorded separately from approval, and two-party signing.

use crate::{
    guard_project_status, guard_transition, record_signature, sections, signature_field, text,
    yes_no, SignatureEntry, SignatureScheme, WorkflowError, WorkflowResult, WorkflowStatus,
};
use chrono::{DateTime, NaiveDate, Utc};
use oms_document::{DocumentEngine, DocumentInstance, GeneratedDocument, TemplateRegistry, TemplateType};
use oms_types::{Actor, Project, ProjectId, ProjectStatus, RoleTag, Timestamps, UserId, WorkflowId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Template rendered by [`ChangeRequest::generate_authorization_document`].
pub const CHANGE_AUTHORIZATION_TEMPLATE: &str = "Change Request Authorization";

/// Projects a change request may be raised against.
pub const CHANGE_ELIGIBLE_STATUSES: [ProjectStatus; 4] = [
    ProjectStatus::Planning,
    ProjectStatus::Development,
    ProjectStatus::Testing,
    ProjectStatus::ClientReview,
];

/// Fields of the `change_request` payload section open to updates.
pub const CHANGE_DETAIL_FIELDS: &[&str] = &["description", "reason"];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeRequestStatus {
    Draft,
    Submitted,
    UnderReview,
    ImpactAssessed,
    ClientDecision,
    Approved,
    Rejected,
    Implemented,
    Closed,
}

impl ChangeRequestStatus {
    pub fn display_label(self) -> &'static str {
        match self {
            ChangeRequestStatus::Draft => "Draft",
            ChangeRequestStatus::Submitted => "Submitted",
            ChangeRequestStatus::UnderReview => "Under Review",
            ChangeRequestStatus::ImpactAssessed => "Impact Assessed",
            ChangeRequestStatus::ClientDecision => "Client Decision",
            ChangeRequestStatus::Approved => "Approved",
            ChangeRequestStatus::Rejected => "Rejected",
            ChangeRequestStatus::Implemented => "Implemented",
            ChangeRequestStatus::Closed => "Closed",
        }
    }
}

impl WorkflowStatus for ChangeRequestStatus {
    fn as_str(self) -> &'static str {
        match self {
            ChangeRequestStatus::Draft => "draft",
            ChangeRequestStatus::Submitted => "submitted",
            ChangeRequestStatus::UnderReview => "under_review",
            ChangeRequestStatus::ImpactAssessed => "impact_assessed",
            ChangeRequestStatus::ClientDecision => "client_decision",
            ChangeRequestStatus::Approved => "approved",
            ChangeRequestStatus::Rejected => "rejected",
            ChangeRequestStatus::Implemented => "implemented",
            ChangeRequestStatus::Closed => "closed",
        }
    }

    fn allowed_targets(self) -> &'static [Self] {
        use ChangeRequestStatus::*;
        match self {
            Draft => &[Submitted],
            Submitted => &[UnderReview, ImpactAssessed],
            UnderReview => &[ImpactAssessed],
            ImpactAssessed => &[ClientDecision],
            ClientDecision => &[Approved, Rejected],
            Approved => &[Implemented],
            Rejected => &[Closed],
            Implemented => &[Closed],
            Closed => &[],
        }
    }
}

/// Client's decision on an assessed change. Recorded alongside, not
/// instead of, the status machine: approval is a separate step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientDecision {
    Proceed,
    Defer,
    Withdraw,
}

impl ClientDecision {
    pub fn display_label(self) -> &'static str {
        match self {
            ClientDecision::Proceed => "Proceed with Change",
            ClientDecision::Defer => "Defer Change",
            ClientDecision::Withdraw => "Withdraw Change",
        }
    }
}

/// Provider impact assessment.
///
/// Consistency rules: additional effort needs an estimated time, and any
/// assessment that is not cost-free needs an estimated cost.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ImpactAssessment {
    pub no_additional_cost: bool,
    pub requires_additional_effort: bool,
    pub estimated_time: Option<String>,
    pub estimated_cost: Option<f64>,
}

impl ImpactAssessment {
    pub fn validate(&self) -> WorkflowResult<()> {
        if self.requires_additional_effort && self.estimated_time.is_none() {
            return Err(WorkflowError::MissingEstimatedTime);
        }
        if !self.no_additional_cost && self.estimated_cost.is_none() {
            return Err(WorkflowError::MissingEstimatedCost);
        }
        Ok(())
    }
}

/// Creation payload for a change request.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CreateChangeRequest {
    pub request_date: NaiveDate,
    pub reference_agreement: String,
    pub description: String,
    pub reason: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChangeRequest {
    pub id: WorkflowId,
    pub project_id: ProjectId,
    pub request_date: NaiveDate,
    pub reference_agreement: String,
    pub status: ChangeRequestStatus,
    pub client_decision: Option<ClientDecision>,
    pub client_rep_signed: bool,
    pub client_rep_signed_at: Option<DateTime<Utc>>,
    pub provider_signed: bool,
    pub provider_signed_at: Option<DateTime<Utc>>,
    pub created_by: UserId,
    pub assessed_by: Option<UserId>,
    pub document: DocumentInstance,
    pub timestamps: Timestamps,
}

impl ChangeRequest {
    /// Create a change request against an active project.
    ///
    /// The backing document is generated immediately from the highest
    /// published CHANGE template; the structured payload sections are
    /// written on top of it. Records enter the machine at `submitted` —
    /// `draft` exists for records staged through other channels.
    pub fn create(
        project: &Project,
        request: CreateChangeRequest,
        actor: &Actor,
        registry: &TemplateRegistry,
        engine: &DocumentEngine,
    ) -> WorkflowResult<Self> {
        guard_project_status(project, &CHANGE_ELIGIBLE_STATUSES)?;

        let template = crate::template_of_type(registry, TemplateType::Change)?;
        let mut data = Map::new();
        data.insert(
            "project_title".into(),
            Value::String(project.project_name.clone()),
        );
        data.insert(
            "client_name".into(),
            Value::String(project.client_name.clone()),
        );
        data.insert(
            "request_date".into(),
            Value::String(request.request_date.format("%Y-%m-%d").to_string()),
        );
        data.insert(
            "reference_agreement".into(),
            Value::String(request.reference_agreement.clone()),
        );
        data.insert(
            "description".into(),
            Value::String(request.description.clone()),
        );
        data.insert("reason".into(), Value::String(request.reason.clone()));

        let generated =
            engine.generate(registry, &template.name, data, Some(actor), Some(project), None)?;
        let mut document = generated.instance;

        let mut change = Map::new();
        change.insert("description".into(), Value::String(request.description));
        change.insert("reason".into(), Value::String(request.reason));
        document.merge_section(sections::CHANGE_REQUEST, change);
        document.merge_section(sections::PROJECT_REFERENCE, crate::project_reference(project));
        // Later stages merge into these, so the keys exist from the start.
        document.merge_section(sections::IMPACT_ASSESSMENT, Map::new());
        document.merge_section(sections::CLIENT_DECISION, Map::new());
        document.merge_section(sections::SIGNATURES, Map::new());

        let record = Self {
            id: WorkflowId::new(),
            project_id: project.id,
            request_date: request.request_date,
            reference_agreement: request.reference_agreement,
            status: ChangeRequestStatus::Submitted,
            client_decision: None,
            client_rep_signed: false,
            client_rep_signed_at: None,
            provider_signed: false,
            provider_signed_at: None,
            created_by: actor.id,
            assessed_by: None,
            document,
            timestamps: Timestamps::now(),
        };

        tracing::info!(
            change_request = %record.id,
            project = %project.project_code,
            "change request created"
        );
        Ok(record)
    }

    /// Move along a plain status edge. Gated edges (`impact_assessed`,
    /// `client_decision`) are only reachable through their operations.
    pub fn transition_to(&mut self, to: ChangeRequestStatus) -> WorkflowResult<()> {
        guard_transition(self.status, to)?;
        let from = self.status;
        self.status = to;
        self.timestamps.touch();
        tracing::info!(
            change_request = %self.id,
            from = from.as_str(),
            to = to.as_str(),
            "change request status changed"
        );
        Ok(())
    }

    /// `draft → submitted`.
    pub fn submit_for_review(&mut self) -> WorkflowResult<()> {
        self.transition_to(ChangeRequestStatus::Submitted)
    }

    /// `submitted → under_review`.
    pub fn begin_review(&mut self) -> WorkflowResult<()> {
        self.transition_to(ChangeRequestStatus::UnderReview)
    }

    /// Update one field of the requested-change section.
    pub fn update_change_details(&mut self, field: &str, value: Value) -> WorkflowResult<()> {
        if !CHANGE_DETAIL_FIELDS.contains(&field) {
            return Err(WorkflowError::UnknownField {
                field: field.to_string(),
                legal: CHANGE_DETAIL_FIELDS,
            });
        }
        let mut patch = Map::new();
        patch.insert(field.to_string(), value);
        self.document.merge_section(sections::CHANGE_REQUEST, patch);
        self.timestamps.touch();
        Ok(())
    }

    pub fn can_be_assessed_by(&self, actor: &Actor) -> bool {
        actor.role.is_staff()
    }

    /// Record the provider impact assessment and advance to
    /// `impact_assessed`. Staff only; valid from `submitted` or
    /// `under_review`.
    pub fn update_impact_assessment(
        &mut self,
        assessment: ImpactAssessment,
        assessor: &Actor,
    ) -> WorkflowResult<()> {
        if !self.can_be_assessed_by(assessor) {
            return Err(WorkflowError::NotEligible {
                role: assessor.role,
            });
        }
        guard_transition(self.status, ChangeRequestStatus::ImpactAssessed)?;
        assessment.validate()?;

        let mut section = Map::new();
        section.insert(
            "no_additional_cost".into(),
            Value::Bool(assessment.no_additional_cost),
        );
        section.insert(
            "requires_additional_effort".into(),
            Value::Bool(assessment.requires_additional_effort),
        );
        if let Some(time) = assessment.estimated_time {
            section.insert("estimated_time".into(), Value::String(time));
        }
        if let Some(cost) = assessment.estimated_cost {
            if let Some(number) = serde_json::Number::from_f64(cost) {
                section.insert("estimated_cost".into(), Value::Number(number));
            }
        }
        self.document.merge_section(sections::IMPACT_ASSESSMENT, section);

        self.status = ChangeRequestStatus::ImpactAssessed;
        self.assessed_by = Some(assessor.id);
        self.timestamps.touch();
        tracing::info!(
            change_request = %self.id,
            assessed_by = %assessor.username,
            "impact assessment recorded"
        );
        Ok(())
    }

    pub fn is_ready_for_client_decision(&self) -> bool {
        self.status == ChangeRequestStatus::ImpactAssessed && self.assessed_by.is_some()
    }

    /// Record the client's decision and park the machine at
    /// `client_decision`. Mapping the decision onto approval or rejection
    /// is an explicit follow-up transition.
    pub fn record_client_decision(&mut self, decision: ClientDecision) -> WorkflowResult<()> {
        if !self.is_ready_for_client_decision() {
            return Err(WorkflowError::NotReadyForClientDecision);
        }
        guard_transition(self.status, ChangeRequestStatus::ClientDecision)?;

        let mut section = Map::new();
        section.insert(
            "decision".into(),
            Value::String(decision.display_label().to_string()),
        );
        section.insert(
            "decided_at".into(),
            Value::String(Utc::now().to_rfc3339()),
        );
        self.document.merge_section(sections::CLIENT_DECISION, section);

        self.client_decision = Some(decision);
        self.status = ChangeRequestStatus::ClientDecision;
        self.timestamps.touch();
        tracing::info!(
            change_request = %self.id,
            decision = decision.display_label(),
            "client decision recorded"
        );
        Ok(())
    }

    pub fn can_sign(&self, actor: &Actor) -> bool {
        match actor.role {
            RoleTag::ClientContact => !self.client_rep_signed,
            RoleTag::Staff | RoleTag::Superadmin => !self.provider_signed,
        }
    }

    /// Sign into the slot the actor's role resolves to. Returns the slot
    /// name. Signing is monotonic per slot.
    pub fn sign(&mut self, actor: &Actor, entry: SignatureEntry) -> WorkflowResult<&'static str> {
        let slot = SignatureScheme::ClientProvider.resolve(actor.role)?;
        let now = Utc::now();
        if slot == crate::CLIENT_REPRESENTATIVE {
            if self.client_rep_signed {
                return Err(WorkflowError::AlreadySigned { slot });
            }
            self.client_rep_signed = true;
            self.client_rep_signed_at = Some(now);
        } else {
            if self.provider_signed {
                return Err(WorkflowError::AlreadySigned { slot });
            }
            self.provider_signed = true;
            self.provider_signed_at = Some(now);
        }
        record_signature(&mut self.document, slot, &entry);
        self.timestamps.touch();
        tracing::info!(change_request = %self.id, slot, signer = %actor.username, "change request signed");
        Ok(slot)
    }

    pub fn is_fully_signed(&self) -> bool {
        self.client_rep_signed && self.provider_signed
    }

    /// Render the change authorization output document. A fresh document
    /// instance is produced on every call; the workflow's own backing
    /// document is not replaced.
    pub fn generate_authorization_document(
        &self,
        project: &Project,
        registry: &TemplateRegistry,
        engine: &DocumentEngine,
        actor: &Actor,
    ) -> WorkflowResult<GeneratedDocument> {
        let data = self.authorization_data(project);
        let signatures = self.document.section(sections::SIGNATURES);
        let generated = engine.generate(
            registry,
            CHANGE_AUTHORIZATION_TEMPLATE,
            data,
            Some(actor),
            Some(project),
            Some(signatures),
        )?;
        Ok(generated)
    }

    fn authorization_data(&self, project: &Project) -> Map<String, Value> {
        let change = self.document.section(sections::CHANGE_REQUEST);
        let impact = self.document.section(sections::IMPACT_ASSESSMENT);

        let mut data = Map::new();
        let mut put = |key: &str, value: String| {
            data.insert(key.to_string(), Value::String(value));
        };

        put("project_title", project.project_name.clone());
        put("client_name", project.client_name.clone());
        put("request_date", self.request_date.format("%Y-%m-%d").to_string());
        put("reference_agreement", self.reference_agreement.clone());

        put("description", text(change.get("description")));
        put("reason", text(change.get("reason")));

        put(
            "no_additional_cost",
            yes_no(impact.get("no_additional_cost")).to_string(),
        );
        put(
            "requires_additional_effort",
            yes_no(impact.get("requires_additional_effort")).to_string(),
        );
        put("estimated_time", text(impact.get("estimated_time")));
        put("estimated_cost", text(impact.get("estimated_cost")));

        put(
            "decision",
            self.client_decision
                .map_or("Pending", ClientDecision::display_label)
                .to_string(),
        );
        put(
            "client_rep_name",
            signature_field(&self.document, crate::CLIENT_REPRESENTATIVE, "name"),
        );
        put(
            "client_rep_signed_date",
            signature_field(&self.document, crate::CLIENT_REPRESENTATIVE, "date"),
        );
        put(
            "provider_name",
            signature_field(&self.document, crate::PROVIDER_REPRESENTATIVE, "name"),
        );
        put(
            "provider_signed_date",
            signature_field(&self.document, crate::PROVIDER_REPRESENTATIVE, "date"),
        );

        put("status", self.status.display_label().to_string());
        put("change_request_id", self.id.to_string());
        data
    }
}
