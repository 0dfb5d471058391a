//! Pilot handover workflow
//!
//! Internal handover of a completed pilot: a sectioned 25-item checklist,
//! a review gate at 80% completion, a go/no-go approval decision recorded
//! separately from the status machine, and a single staff-only team-lead
//! signature. Many handovers may exist per project.

use crate::{
    guard_project_status, guard_transition, handover_completion, record_signature, sections,
    signature_field, validate_handover_patch, SignatureEntry, SignatureScheme, WorkflowError,
    WorkflowResult, WorkflowStatus, HANDOVER_SECTION_NAMES,
};
use chrono::{DateTime, NaiveDate, Utc};
use oms_document::{DocumentEngine, DocumentInstance, GeneratedDocument, TemplateRegistry, TemplateType};
use oms_types::{Actor, Project, ProjectId, ProjectStatus, Timestamps, UserId, WorkflowId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Template rendered by [`PilotHandover::generate_handover_document`].
pub const HANDOVER_TEMPLATE: &str = "Internal Pilot Handover";

/// Minimum checklist completion before a handover can enter review.
pub const REVIEW_COMPLETION_THRESHOLD: u8 = 80;

/// Projects far enough along for a handover record.
pub const HANDOVER_ELIGIBLE_STATUSES: [ProjectStatus; 3] = [
    ProjectStatus::Testing,
    ProjectStatus::ClientReview,
    ProjectStatus::Completed,
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandoverStatus {
    Draft,
    InProgress,
    ReadyForReview,
    Approved,
    Hold,
    Completed,
}

impl HandoverStatus {
    pub fn display_label(self) -> &'static str {
        match self {
            HandoverStatus::Draft => "Draft",
            HandoverStatus::InProgress => "In Progress",
            HandoverStatus::ReadyForReview => "Ready for Review",
            HandoverStatus::Approved => "Approved",
            HandoverStatus::Hold => "Hold",
            HandoverStatus::Completed => "Completed",
        }
    }
}

impl WorkflowStatus for HandoverStatus {
    fn as_str(self) -> &'static str {
        match self {
            HandoverStatus::Draft => "draft",
            HandoverStatus::InProgress => "in_progress",
            HandoverStatus::ReadyForReview => "ready_for_review",
            HandoverStatus::Approved => "approved",
            HandoverStatus::Hold => "hold",
            HandoverStatus::Completed => "completed",
        }
    }

    /// `ready_for_review` and the approval outcomes are only reachable
    /// through `submit_for_review` and `make_approval_decision`.
    fn allowed_targets(self) -> &'static [Self] {
        use HandoverStatus::*;
        match self {
            Draft => &[InProgress],
            InProgress => &[],
            ReadyForReview => &[],
            Approved => &[Completed],
            Hold => &[Completed],
            Completed => &[],
        }
    }
}

/// Final go/no-go decision, recorded alongside the status.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoNoGo {
    Approved,
    Hold,
}

impl GoNoGo {
    pub fn display_label(self) -> &'static str {
        match self {
            GoNoGo::Approved => "Approved - Ready for Handover",
            GoNoGo::Hold => "Hold - Issues to Resolve",
        }
    }
}

/// Creation payload for a pilot handover.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CreateHandover {
    pub expected_delivery_date: NaiveDate,
    pub assigned_team_members: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PilotHandover {
    pub id: WorkflowId,
    pub project_id: ProjectId,
    pub expected_delivery_date: NaiveDate,
    pub assigned_team_members: Vec<String>,
    pub status: HandoverStatus,
    pub final_go_no_go: Option<GoNoGo>,
    pub team_lead_signed: bool,
    pub team_lead_signed_at: Option<DateTime<Utc>>,
    pub created_by: UserId,
    pub reviewed_by: Option<UserId>,
    pub document: DocumentInstance,
    pub timestamps: Timestamps,
}

impl PilotHandover {
    /// Create a handover record for a project in testing or later.
    pub fn create(
        project: &Project,
        request: CreateHandover,
        actor: &Actor,
        registry: &TemplateRegistry,
        engine: &DocumentEngine,
    ) -> WorkflowResult<Self> {
        guard_project_status(project, &HANDOVER_ELIGIBLE_STATUSES)?;

        let template = crate::template_of_type(registry, TemplateType::Handover)?;
        let mut data = Map::new();
        data.insert(
            "client_school_name".into(),
            Value::String(project.client_name.clone()),
        );
        data.insert(
            "pilot_start_date".into(),
            Value::String(start_date_or_na(project)),
        );
        data.insert(
            "expected_delivery_date".into(),
            Value::String(request.expected_delivery_date.format("%Y-%m-%d").to_string()),
        );
        data.insert(
            "assigned_team_members".into(),
            Value::String(request.assigned_team_members.join(", ")),
        );

        let generated =
            engine.generate(registry, &template.name, data, Some(actor), Some(project), None)?;
        let mut document = generated.instance;
        document.merge_section(sections::PROJECT_REFERENCE, crate::project_reference(project));
        document.merge_section(sections::CHECKLIST, Map::new());
        document.merge_section(sections::SIGNATURES, Map::new());
        document.merge_section(sections::HANDOVER_APPROVAL, Map::new());

        let record = Self {
            id: WorkflowId::new(),
            project_id: project.id,
            expected_delivery_date: request.expected_delivery_date,
            assigned_team_members: request.assigned_team_members,
            status: HandoverStatus::Draft,
            final_go_no_go: None,
            team_lead_signed: false,
            team_lead_signed_at: None,
            created_by: actor.id,
            reviewed_by: None,
            document,
            timestamps: Timestamps::now(),
        };

        tracing::info!(
            handover = %record.id,
            project = %project.project_code,
            "pilot handover created"
        );
        Ok(record)
    }

    /// Move along a plain status edge.
    pub fn transition_to(&mut self, to: HandoverStatus) -> WorkflowResult<()> {
        guard_transition(self.status, to)?;
        let from = self.status;
        self.status = to;
        self.timestamps.touch();
        tracing::info!(
            handover = %self.id,
            from = from.as_str(),
            to = to.as_str(),
            "handover status changed"
        );
        Ok(())
    }

    /// Merge a patch into one checklist section. The patch is validated
    /// in full before anything is written; sibling items already present
    /// in the section are preserved.
    pub fn update_checklist_section(
        &mut self,
        section: &str,
        patch: Map<String, Value>,
    ) -> WorkflowResult<()> {
        validate_handover_patch(section, &patch)?;
        let mut checklist = self.document.section(sections::CHECKLIST);
        let entry = checklist
            .entry(section.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if let Some(items) = entry.as_object_mut() {
            for (item, value) in patch {
                items.insert(item, value);
            }
        }
        self.document.merge_section(sections::CHECKLIST, checklist);
        self.timestamps.touch();
        Ok(())
    }

    /// `trunc(completed / present * 100)` across all sections.
    pub fn completion_percentage(&self) -> u8 {
        handover_completion(&self.document.section(sections::CHECKLIST))
    }

    /// Submit for review. Valid from `draft` or `in_progress`, gated on
    /// the checklist being at least 80% complete; the reviewer must be
    /// staff and is recorded on the record.
    pub fn submit_for_review(&mut self, reviewer: &Actor) -> WorkflowResult<()> {
        if !matches!(self.status, HandoverStatus::Draft | HandoverStatus::InProgress) {
            return Err(WorkflowError::InvalidStatusTransition {
                from: self.status.as_str(),
                to: HandoverStatus::ReadyForReview.as_str(),
                allowed: vec!["draft", "in_progress"],
            });
        }
        if !reviewer.role.is_staff() {
            return Err(WorkflowError::NotEligible {
                role: reviewer.role,
            });
        }
        let completion = self.completion_percentage();
        if completion < REVIEW_COMPLETION_THRESHOLD {
            return Err(WorkflowError::ChecklistIncomplete {
                completion,
                required: REVIEW_COMPLETION_THRESHOLD,
            });
        }

        self.status = HandoverStatus::ReadyForReview;
        self.reviewed_by = Some(reviewer.id);
        self.timestamps.touch();
        tracing::info!(
            handover = %self.id,
            reviewer = %reviewer.username,
            completion,
            "handover submitted for review"
        );
        Ok(())
    }

    /// Record the go/no-go decision. Only valid while `ready_for_review`;
    /// the status follows the decision to `approved` or `hold`.
    pub fn make_approval_decision(&mut self, decision: GoNoGo) -> WorkflowResult<()> {
        if self.status != HandoverStatus::ReadyForReview {
            return Err(WorkflowError::NotReviewable {
                status: self.status.as_str(),
            });
        }

        let mut section = Map::new();
        section.insert(
            "final_go_no_go".into(),
            Value::String(decision.display_label().to_string()),
        );
        section.insert("decided_at".into(), Value::String(Utc::now().to_rfc3339()));
        self.document.merge_section(sections::HANDOVER_APPROVAL, section);

        self.final_go_no_go = Some(decision);
        self.status = match decision {
            GoNoGo::Approved => HandoverStatus::Approved,
            GoNoGo::Hold => HandoverStatus::Hold,
        };
        self.timestamps.touch();
        tracing::info!(
            handover = %self.id,
            decision = decision.display_label(),
            "handover approval decision recorded"
        );
        Ok(())
    }

    pub fn is_ready_for_handover(&self) -> bool {
        self.status == HandoverStatus::ReadyForReview && self.team_lead_signed
    }

    pub fn can_sign(&self, actor: &Actor) -> bool {
        actor.role.is_staff() && !self.team_lead_signed
    }

    /// Team-lead sign-off. Staff only, monotonic.
    pub fn sign(&mut self, actor: &Actor, entry: SignatureEntry) -> WorkflowResult<&'static str> {
        let slot = SignatureScheme::TeamLeadOnly.resolve(actor.role)?;
        if self.team_lead_signed {
            return Err(WorkflowError::AlreadySigned { slot });
        }
        self.team_lead_signed = true;
        self.team_lead_signed_at = Some(Utc::now());
        record_signature(&mut self.document, slot, &entry);
        self.timestamps.touch();
        tracing::info!(handover = %self.id, signer = %actor.username, "handover signed by team lead");
        Ok(slot)
    }

    /// Render the internal handover output document. A fresh document
    /// instance is produced on every call.
    pub fn generate_handover_document(
        &self,
        project: &Project,
        registry: &TemplateRegistry,
        engine: &DocumentEngine,
        actor: &Actor,
    ) -> WorkflowResult<GeneratedDocument> {
        let data = self.handover_data(project);
        let signatures = self.document.section(sections::SIGNATURES);
        let generated = engine.generate(
            registry,
            HANDOVER_TEMPLATE,
            data,
            Some(actor),
            Some(project),
            Some(signatures),
        )?;
        Ok(generated)
    }

    fn handover_data(&self, project: &Project) -> Map<String, Value> {
        let checklist = self.document.section(sections::CHECKLIST);

        let mut data = Map::new();
        data.insert(
            "client_school_name".into(),
            Value::String(project.client_name.clone()),
        );
        data.insert(
            "pilot_start_date".into(),
            Value::String(start_date_or_na(project)),
        );
        data.insert(
            "expected_delivery_date".into(),
            Value::String(self.expected_delivery_date.format("%Y-%m-%d").to_string()),
        );
        data.insert(
            "assigned_team_members".into(),
            Value::String(self.assigned_team_members.join(", ")),
        );

        for section in HANDOVER_SECTION_NAMES {
            data.insert(
                section.to_string(),
                checklist.get(*section).cloned().unwrap_or(Value::Object(Map::new())),
            );
        }

        data.insert(
            "final_go_no_go".into(),
            Value::String(
                self.final_go_no_go
                    .map_or("Pending", GoNoGo::display_label)
                    .to_string(),
            ),
        );
        data.insert(
            "team_lead_name".into(),
            Value::String(signature_field(&self.document, crate::TEAM_LEAD, "name")),
        );
        data.insert(
            "team_lead_signature_date".into(),
            Value::String(signature_field(&self.document, crate::TEAM_LEAD, "date")),
        );

        data.insert(
            "status".into(),
            Value::String(self.status.display_label().to_string()),
        );
        data.insert(
            "completion_percentage".into(),
            Value::String(format!("{}%", self.completion_percentage())),
        );
        data.insert("handover_id".into(), Value::String(self.id.to_string()));
        data
    }
}

fn start_date_or_na(project: &Project) -> String {
    project
        .start_date
        .map_or_else(|| "N/A".to_string(), |d| d.format("%Y-%m-%d").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use oms_document::{DocumentTemplate, MemoryArtifactStore, TextRenderer};
    use oms_types::RoleTag;
    use serde_json::json;
    use std::sync::Arc;

    fn registry() -> TemplateRegistry {
        let mut registry = TemplateRegistry::new();
        registry
            .insert(
                DocumentTemplate::new(
                    HANDOVER_TEMPLATE,
                    TemplateType::Handover,
                    "{{ final_go_no_go }} / {{ completion_percentage }} / {{ team_lead_name }}",
                )
                .published(),
            )
            .unwrap();
        registry
    }

    fn engine() -> DocumentEngine {
        DocumentEngine::new(Arc::new(TextRenderer), Arc::new(MemoryArtifactStore::new()))
    }

    fn project() -> Project {
        Project::new("Pilot Site", "PROJ-2026-001", "Hillside School")
            .with_status(ProjectStatus::Testing)
    }

    fn request() -> CreateHandover {
        CreateHandover {
            expected_delivery_date: NaiveDate::from_ymd_opt(2026, 9, 10).unwrap(),
            assigned_team_members: vec!["Dana Osei".into(), "Kofi Boateng".into()],
        }
    }

    fn staff() -> Actor {
        Actor::new("dana", RoleTag::Staff)
    }

    fn created() -> PilotHandover {
        PilotHandover::create(&project(), request(), &staff(), &registry(), &engine()).unwrap()
    }

    fn object(value: serde_json::Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    fn fill_section(record: &mut PilotHandover, section: &str, value: bool) {
        let items = crate::handover_section_items(section).unwrap();
        let patch = items
            .iter()
            .map(|item| (item.to_string(), Value::Bool(value)))
            .collect();
        record.update_checklist_section(section, patch).unwrap();
    }

    #[test]
    fn create_requires_testing_or_later() {
        let early = project().with_status(ProjectStatus::Planning);
        let err = PilotHandover::create(&early, request(), &staff(), &registry(), &engine())
            .unwrap_err();
        assert!(matches!(err, WorkflowError::ProjectNotEligible { .. }));
    }

    #[test]
    fn section_updates_preserve_siblings() {
        let mut record = created();
        record
            .update_checklist_section("technical_setup", object(json!({"ssl_active": true})))
            .unwrap();
        record
            .update_checklist_section(
                "technical_setup",
                object(json!({"domain_configured": true})),
            )
            .unwrap();

        let checklist = record.document.section(sections::CHECKLIST);
        let section = checklist["technical_setup"].as_object().unwrap();
        assert_eq!(section["ssl_active"], json!(true));
        assert_eq!(section["domain_configured"], json!(true));
    }

    #[test]
    fn invalid_patches_are_rejected_whole() {
        let mut record = created();
        let err = record
            .update_checklist_section(
                "technical_setup",
                object(json!({"ssl_active": true, "wifi_works": true})),
            )
            .unwrap_err();
        assert!(matches!(err, WorkflowError::UnknownChecklistItem { .. }));
        assert!(record.document.section(sections::CHECKLIST).is_empty());
    }

    #[test]
    fn completion_truncates_over_present_items() {
        let mut record = created();
        record
            .update_checklist_section(
                "technical_setup",
                object(json!({
                    "domain_configured": true,
                    "ssl_active": true,
                    "site_load_ok": false,
                })),
            )
            .unwrap();
        assert_eq!(record.completion_percentage(), 66);
    }

    #[test]
    fn review_gate_requires_eighty_percent() {
        let mut record = created();
        fill_section(&mut record, "technical_setup", true);
        fill_section(&mut record, "core_pages", false);

        let err = record.submit_for_review(&staff()).unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::ChecklistIncomplete {
                completion: 50,
                required: 80
            }
        ));
        assert_eq!(record.status, HandoverStatus::Draft);

        fill_section(&mut record, "core_pages", true);
        record.submit_for_review(&staff()).unwrap();
        assert_eq!(record.status, HandoverStatus::ReadyForReview);
        assert!(record.reviewed_by.is_some());
    }

    #[test]
    fn review_is_staff_only_and_status_gated() {
        let mut record = created();
        fill_section(&mut record, "technical_setup", true);

        let outsider = Actor::new("amara", RoleTag::ClientContact);
        assert!(matches!(
            record.submit_for_review(&outsider),
            Err(WorkflowError::NotEligible { .. })
        ));

        record.submit_for_review(&staff()).unwrap();
        assert!(matches!(
            record.submit_for_review(&staff()),
            Err(WorkflowError::InvalidStatusTransition { .. })
        ));
    }

    #[test]
    fn approval_decision_follows_review() {
        let mut record = created();
        assert!(matches!(
            record.make_approval_decision(GoNoGo::Approved),
            Err(WorkflowError::NotReviewable { .. })
        ));

        fill_section(&mut record, "technical_setup", true);
        record.submit_for_review(&staff()).unwrap();
        record.make_approval_decision(GoNoGo::Hold).unwrap();
        assert_eq!(record.status, HandoverStatus::Hold);
        assert_eq!(record.final_go_no_go, Some(GoNoGo::Hold));
        assert_eq!(
            record.document.section(sections::HANDOVER_APPROVAL)["final_go_no_go"],
            "Hold - Issues to Resolve"
        );

        record.transition_to(HandoverStatus::Completed).unwrap();
    }

    #[test]
    fn signing_is_staff_only_and_monotonic() {
        let mut record = created();
        let outsider = Actor::new("amara", RoleTag::ClientContact);
        assert!(!record.can_sign(&outsider));
        assert!(matches!(
            record.sign(&outsider, SignatureEntry::new("Amara Mensah", "Head Teacher")),
            Err(WorkflowError::NotEligible { .. })
        ));

        let slot = record
            .sign(&staff(), SignatureEntry::new("Dana Osei", "Team Lead"))
            .unwrap();
        assert_eq!(slot, crate::TEAM_LEAD);
        assert!(record.team_lead_signed);
        assert!(matches!(
            record.sign(&staff(), SignatureEntry::new("Dana Osei", "Team Lead")),
            Err(WorkflowError::AlreadySigned { .. })
        ));
    }

    #[test]
    fn ready_for_handover_needs_review_status_and_signature() {
        let mut record = created();
        fill_section(&mut record, "technical_setup", true);
        record.submit_for_review(&staff()).unwrap();
        assert!(!record.is_ready_for_handover());

        record
            .sign(&staff(), SignatureEntry::new("Dana Osei", "Team Lead"))
            .unwrap();
        assert!(record.is_ready_for_handover());
    }

    #[test]
    fn handover_document_reports_pending_decision() {
        let mut record = created();
        record
            .sign(&staff(), SignatureEntry::new("Dana Osei", "Team Lead"))
            .unwrap();

        let generated = record
            .generate_handover_document(&project(), &registry(), &engine(), &staff())
            .unwrap();
        let rendered = String::from_utf8(generated.bytes).unwrap();
        assert_eq!(rendered, "Pending / 0% / Dana Osei");
    }
}
