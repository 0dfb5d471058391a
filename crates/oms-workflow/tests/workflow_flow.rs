//! End-to-end workflow scenarios against the in-memory store.

use chrono::NaiveDate;
use oms_document::{
    DocumentTemplate, DocumentEngine, MemoryArtifactStore, MemoryAuditSink, TemplateRegistry,
    TemplateType, TextRenderer,
};
use oms_types::{Actor, Project, ProjectStatus, RoleTag};
use oms_workflow::{
    sections, AcceptanceStatus, ChangeRequestStatus, ClientDecision, CreateAcceptance,
    CreateChangeRequest, CreateHandover, GoNoGo, HandoverStatus, ImpactAssessment, SignatureEntry,
    WorkflowError, WorkflowStore, ACCEPTANCE_CERTIFICATE_TEMPLATE, CHANGE_AUTHORIZATION_TEMPLATE,
    HANDOVER_TEMPLATE,
};
use serde_json::json;
use std::sync::Arc;

struct Fixture {
    registry: TemplateRegistry,
    engine: DocumentEngine,
    audit: Arc<MemoryAuditSink>,
    store: WorkflowStore,
}

fn fixture() -> Fixture {
    let mut registry = TemplateRegistry::new();
    registry
        .insert(
            DocumentTemplate::new(
                CHANGE_AUTHORIZATION_TEMPLATE,
                TemplateType::Change,
                "{{ description }} | {{ decision }} | {{ status }}",
            )
            .published(),
        )
        .unwrap();
    registry
        .insert(
            DocumentTemplate::new(
                ACCEPTANCE_CERTIFICATE_TEMPLATE,
                TemplateType::Acceptance,
                "{{ acceptance_status }} | {{ digital_gateway_live }} | {{ completion_percentage }}",
            )
            .published(),
        )
        .unwrap();
    registry
        .insert(
            DocumentTemplate::new(
                HANDOVER_TEMPLATE,
                TemplateType::Handover,
                "{{ final_go_no_go }} | {{ completion_percentage }} | {{ team_lead_name }}",
            )
            .published(),
        )
        .unwrap();

    let audit = Arc::new(MemoryAuditSink::new());
    let engine = DocumentEngine::new(Arc::new(TextRenderer), Arc::new(MemoryArtifactStore::new()))
        .with_audit_sink(audit.clone());

    Fixture {
        registry,
        engine,
        audit,
        store: WorkflowStore::new(),
    }
}

fn staff() -> Actor {
    Actor::new("dana", RoleTag::Staff)
}

fn client_rep() -> Actor {
    Actor::new("amara", RoleTag::ClientContact)
}

#[test]
fn change_request_end_to_end() {
    let mut fx = fixture();
    let project = Project::new("Pilot Site", "PROJ-2026-001", "Hillside School")
        .with_status(ProjectStatus::Development);

    let id = fx
        .store
        .create_change_request(
            &project,
            CreateChangeRequest {
                request_date: NaiveDate::from_ymd_opt(2026, 8, 20).unwrap(),
                reference_agreement: "MSA-2025-014".into(),
                description: "Add a parent portal".into(),
                reason: "Requested by the school board".into(),
            },
            &staff(),
            &fx.registry,
            &fx.engine,
        )
        .unwrap();

    let record = fx.store.change_request_mut(id).unwrap();
    assert_eq!(record.status, ChangeRequestStatus::Submitted);

    record.begin_review().unwrap();
    record
        .update_impact_assessment(
            ImpactAssessment {
                no_additional_cost: false,
                requires_additional_effort: true,
                estimated_time: Some("40 hours".into()),
                estimated_cost: Some(1200.0),
            },
            &staff(),
        )
        .unwrap();
    assert!(record.is_ready_for_client_decision());

    record.record_client_decision(ClientDecision::Proceed).unwrap();
    record.transition_to(ChangeRequestStatus::Approved).unwrap();

    record
        .sign(&client_rep(), SignatureEntry::new("Amara Mensah", "Head Teacher"))
        .unwrap();
    record
        .sign(&staff(), SignatureEntry::new("Dana Osei", "Project Lead"))
        .unwrap();
    assert!(record.is_fully_signed());

    record.transition_to(ChangeRequestStatus::Implemented).unwrap();
    record.transition_to(ChangeRequestStatus::Closed).unwrap();

    let record = fx.store.change_request(id).unwrap();
    let generated = record
        .generate_authorization_document(&project, &fx.registry, &fx.engine, &staff())
        .unwrap();
    assert_eq!(
        String::from_utf8(generated.bytes).unwrap(),
        "Add a parent portal | Proceed with Change | Closed"
    );
    assert!(generated
        .instance
        .document_number
        .starts_with("CHANGE-"));

    // Every generation run leaves an audit event behind.
    let events = fx.audit.events();
    assert!(events.iter().all(|e| e.event_type == "document_generated"));
    assert_eq!(events.len(), 2);
}

#[test]
fn acceptance_end_to_end_with_cardinality() {
    let mut fx = fixture();
    let project = Project::new("Pilot Site", "PROJ-2026-001", "Hillside School")
        .with_status(ProjectStatus::ClientReview)
        .with_start_date(NaiveDate::from_ymd_opt(2026, 5, 1).unwrap());

    let request = CreateAcceptance {
        acceptance_status: AcceptanceStatus::AcceptedWithConditions,
        completion_date: NaiveDate::from_ymd_opt(2026, 8, 25).unwrap(),
        token_payment: Some(500.0),
        issues_to_resolve: "Two broken portal links".into(),
    };
    let id = fx
        .store
        .create_acceptance(&project, request.clone(), &staff(), &fx.registry, &fx.engine)
        .unwrap();

    assert!(matches!(
        fx.store
            .create_acceptance(&project, request, &staff(), &fx.registry, &fx.engine),
        Err(WorkflowError::AcceptanceExists(_))
    ));

    let record = fx.store.acceptance_mut(id).unwrap();
    record
        .update_checklist_item("digital_gateway_live", json!(true))
        .unwrap();
    record
        .update_checklist_item("mobile_friendly", json!(true))
        .unwrap();
    assert_eq!(record.completion_percentage(), 16.7);

    record
        .sign(&client_rep(), SignatureEntry::new("Amara Mensah", "Head Teacher"))
        .unwrap();
    record
        .sign(&staff(), SignatureEntry::new("Dana Osei", "Project Lead"))
        .unwrap();
    assert!(record.is_fully_signed());

    let generated = record
        .generate_certificate(&project, &fx.registry, &fx.engine, &staff())
        .unwrap();
    assert_eq!(
        String::from_utf8(generated.bytes).unwrap(),
        "Accepted with Conditions | Yes | 16.7%"
    );
}

#[test]
fn handover_end_to_end_through_review_gate() {
    let mut fx = fixture();
    let project = Project::new("Pilot Site", "PROJ-2026-001", "Hillside School")
        .with_status(ProjectStatus::Testing);

    let id = fx
        .store
        .create_handover(
            &project,
            CreateHandover {
                expected_delivery_date: NaiveDate::from_ymd_opt(2026, 9, 10).unwrap(),
                assigned_team_members: vec!["Dana Osei".into(), "Kofi Boateng".into()],
            },
            &staff(),
            &fx.registry,
            &fx.engine,
        )
        .unwrap();

    let record = fx.store.handover_mut(id).unwrap();
    record.transition_to(HandoverStatus::InProgress).unwrap();

    // 3 of 5 present items complete: 60%, below the gate.
    record
        .update_checklist_section(
            "technical_setup",
            json!({
                "domain_configured": true,
                "ssl_active": true,
                "site_load_ok": true,
                "responsive_design": false,
                "no_broken_links": false,
            })
            .as_object()
            .unwrap()
            .clone(),
        )
        .unwrap();
    assert!(matches!(
        record.submit_for_review(&staff()),
        Err(WorkflowError::ChecklistIncomplete {
            completion: 60,
            required: 80
        })
    ));

    record
        .update_checklist_section(
            "technical_setup",
            json!({"responsive_design": true, "no_broken_links": true})
                .as_object()
                .unwrap()
                .clone(),
        )
        .unwrap();
    assert_eq!(record.completion_percentage(), 100);

    record.submit_for_review(&staff()).unwrap();
    record
        .sign(&staff(), SignatureEntry::new("Dana Osei", "Team Lead"))
        .unwrap();
    assert!(record.is_ready_for_handover());

    record.make_approval_decision(GoNoGo::Approved).unwrap();
    assert_eq!(record.status, HandoverStatus::Approved);
    record.transition_to(HandoverStatus::Completed).unwrap();

    let generated = record
        .generate_handover_document(&project, &fx.registry, &fx.engine, &staff())
        .unwrap();
    assert_eq!(
        String::from_utf8(generated.bytes).unwrap(),
        "Approved - Ready for Handover | 100% | Dana Osei"
    );

    // The backing document kept its structured payload through it all.
    let document = &fx.store.handover(id).unwrap().document;
    assert_eq!(
        document.section(sections::PROJECT_REFERENCE)["project_title"],
        "Pilot Site"
    );
    assert_eq!(
        document.section(sections::HANDOVER_APPROVAL)["final_go_no_go"],
        "Approved - Ready for Handover"
    );
    assert!(document.revision >= 3);
}
