//! Document engine: validate, render, persist
//!
//! The engine is the single path from a template plus data to a stored
//! document. It owns the renderer and artifact-store seams; the template
//! registry is passed per call so callers can share one registry across
//! engines.

use crate::{
    ArtifactRef, ArtifactStore, AuditEvent, AuditSink, DocumentError, DocumentInstance,
    DocumentResult, DocumentStatus, RenderContext, RenderError, Renderer, Severity,
    SystemIdentity, TemplateRegistry, TracingAuditSink,
};
use chrono::Utc;
use oms_types::{Actor, DocumentId, Project, Timestamps};
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Complexity tier of a rendered artifact, classified by size.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DocumentComplexity {
    /// 1-2 pages, text only (< 50KB).
    Simple,
    /// 3-5 pages with basic formatting (< 200KB).
    Standard,
    /// 5+ pages with images and tables (>= 200KB).
    Complex,
    /// Complex documents on constrained hardware.
    LowEnd,
}

impl DocumentComplexity {
    pub fn classify(size_bytes: usize) -> Self {
        if size_bytes < 50_000 {
            DocumentComplexity::Simple
        } else if size_bytes < 200_000 {
            DocumentComplexity::Standard
        } else {
            DocumentComplexity::Complex
        }
    }

    /// Wall-clock SLA for generation at this tier. Breaches are logged,
    /// never enforced.
    pub fn sla(self) -> Duration {
        match self {
            DocumentComplexity::Simple => Duration::from_secs(3),
            DocumentComplexity::Standard => Duration::from_secs(5),
            DocumentComplexity::Complex => Duration::from_secs(8),
            DocumentComplexity::LowEnd => Duration::from_secs(12),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DocumentComplexity::Simple => "simple",
            DocumentComplexity::Standard => "standard",
            DocumentComplexity::Complex => "complex",
            DocumentComplexity::LowEnd => "low_end",
        }
    }
}

/// Result of a generation run: the persisted instance plus the raw bytes,
/// so callers can stream the artifact without a second store round-trip.
#[derive(Clone, Debug)]
pub struct GeneratedDocument {
    pub instance: DocumentInstance,
    pub bytes: Vec<u8>,
}

/// The unified document generation service.
pub struct DocumentEngine {
    renderer: Arc<dyn Renderer>,
    store: Arc<dyn ArtifactStore>,
    audit: Arc<dyn AuditSink>,
    identity: SystemIdentity,
}

impl DocumentEngine {
    pub fn new(renderer: Arc<dyn Renderer>, store: Arc<dyn ArtifactStore>) -> Self {
        Self {
            renderer,
            store,
            audit: Arc::new(TracingAuditSink),
            identity: SystemIdentity::default(),
        }
    }

    pub fn with_audit_sink(mut self, audit: Arc<dyn AuditSink>) -> Self {
        self.audit = audit;
        self
    }

    pub fn with_identity(mut self, identity: SystemIdentity) -> Self {
        self.identity = identity;
        self
    }

    /// Generate a document from a published template.
    ///
    /// Validation is a hard precondition: if any required field is missing
    /// no rendering happens and no instance is created. Renderer failures
    /// are wrapped with the template name and elapsed time and surfaced
    /// as-is — the caller decides whether to resubmit.
    pub fn generate(
        &self,
        registry: &TemplateRegistry,
        template_name: &str,
        data: Map<String, Value>,
        actor: Option<&Actor>,
        project: Option<&Project>,
        signature_context: Option<Map<String, Value>>,
    ) -> DocumentResult<GeneratedDocument> {
        let started = Instant::now();

        let template = registry.lookup(template_name)?;

        let validation = template.validate_data(&data);
        if !validation.is_valid {
            return Err(DocumentError::ValidationFailed {
                template: template.name.clone(),
                missing_fields: validation.missing_fields,
            });
        }

        let mut context = RenderContext::new(data.clone(), actor, project, self.identity.clone());
        if let Some(signature) = signature_context {
            context = context.with_signature(signature);
        }

        let bytes = self
            .renderer
            .render(&template.content, &context)
            .map_err(|source: RenderError| {
                let elapsed_ms = started.elapsed().as_millis();
                tracing::error!(
                    template = %template.name,
                    elapsed_ms,
                    error = %source,
                    "document rendering failed"
                );
                DocumentError::RenderFailed {
                    template: template.name.clone(),
                    elapsed_ms,
                    source,
                }
            })?;

        let now = Utc::now();
        let document_number = format!("{}-{}", template.template_type, now.format("%Y%m%d-%H%M%S"));

        let mut document_title = format!(
            "{} - {}",
            template.name,
            data.get("title")
                .and_then(Value::as_str)
                .unwrap_or("Document")
        );
        if let Some(project) = project {
            document_title = format!("{document_title} - {}", project.project_name);
        }

        let path = self
            .store
            .put(&format!("documents/{document_number}.pdf"), &bytes)?;

        let instance = DocumentInstance {
            id: DocumentId::new(),
            template_id: template.id,
            template_name: template.name.clone(),
            template_type: template.template_type,
            project_id: project.map(|p| p.id),
            filled_data: data,
            artifact: Some(ArtifactRef {
                path,
                size_bytes: bytes.len(),
            }),
            document_title,
            document_number,
            status: DocumentStatus::Generated,
            signed_by: None,
            signed_at: None,
            created_by: actor.map(|a| a.id),
            revision: 0,
            timestamps: Timestamps::now(),
        };

        let elapsed = started.elapsed();
        self.log_performance(&template.name, elapsed, bytes.len());

        self.audit.record(
            AuditEvent::new("document_generated", Severity::Low)
                .with_actor(
                    actor.map_or_else(|| "system".to_string(), |a| a.username.clone()),
                )
                .with_detail("template_name", template.name.clone())
                .with_detail("template_type", template.template_type.to_string())
                .with_detail("generation_time_ms", elapsed.as_millis() as u64)
                .with_detail("artifact_size_bytes", bytes.len() as u64),
        );

        tracing::info!(
            template = %template.name,
            document_number = %instance.document_number,
            elapsed_ms = elapsed.as_millis() as u64,
            "document generated"
        );

        Ok(GeneratedDocument { instance, bytes })
    }

    /// Store a timestamped, type-tagged copy in the append-only audit area.
    ///
    /// Independent of the instance's own artifact; used for compliance
    /// retention.
    pub fn store_audited_copy(
        &self,
        bytes: &[u8],
        metadata: &Map<String, Value>,
        actor: Option<&Actor>,
    ) -> DocumentResult<String> {
        let template_type = metadata
            .get("template_type")
            .and_then(Value::as_str)
            .unwrap_or("unknown");
        let filename = format!(
            "audit_{}_{}.pdf",
            Utc::now().format("%Y%m%d_%H%M%S"),
            template_type
        );

        let path = self.store.put(&format!("documents/audit/{filename}"), bytes)?;

        self.audit.record(
            AuditEvent::new("document_stored", Severity::Low)
                .with_actor(
                    actor.map_or_else(|| "system".to_string(), |a| a.username.clone()),
                )
                .with_detail("file_path", path.clone())
                .with_detail("file_size_bytes", bytes.len() as u64)
                .with_detail("metadata", Value::Object(metadata.clone())),
        );

        tracing::info!(%path, "audited document copy stored");
        Ok(path)
    }

    fn log_performance(&self, template_name: &str, elapsed: Duration, size_bytes: usize) {
        let complexity = DocumentComplexity::classify(size_bytes);
        let sla = complexity.sla();
        if elapsed > sla {
            tracing::warn!(
                template = template_name,
                elapsed_ms = elapsed.as_millis() as u64,
                sla_ms = sla.as_millis() as u64,
                complexity = complexity.as_str(),
                "document generation exceeded SLA"
            );
        } else {
            tracing::debug!(
                template = template_name,
                elapsed_ms = elapsed.as_millis() as u64,
                sla_ms = sla.as_millis() as u64,
                complexity = complexity.as_str(),
                "document generation within SLA"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DocumentTemplate, MemoryArtifactStore, MemoryAuditSink, TemplateType, TextRenderer};
    use serde_json::json;

    fn registry() -> TemplateRegistry {
        let mut registry = TemplateRegistry::new();
        registry
            .insert(
                DocumentTemplate::new(
                    "Intake Form",
                    TemplateType::Intake,
                    "{{ title }} for {{ client_name }}",
                )
                .with_required_fields(["title", "client_name"])
                .published(),
            )
            .unwrap();
        registry
    }

    fn engine_with_sinks() -> (DocumentEngine, Arc<MemoryArtifactStore>, Arc<MemoryAuditSink>) {
        let store = Arc::new(MemoryArtifactStore::new());
        let audit = Arc::new(MemoryAuditSink::new());
        let engine = DocumentEngine::new(Arc::new(TextRenderer), store.clone())
            .with_audit_sink(audit.clone());
        (engine, store, audit)
    }

    #[test]
    fn generate_produces_instance_and_artifact() {
        let (engine, store, audit) = engine_with_sinks();
        let data = json!({"title": "Kickoff", "client_name": "Hillside School"})
            .as_object()
            .unwrap()
            .clone();

        let generated = engine
            .generate(&registry(), "Intake Form", data, None, None, None)
            .unwrap();

        assert_eq!(generated.bytes, b"Kickoff for Hillside School");
        assert_eq!(generated.instance.status, DocumentStatus::Generated);
        assert!(generated.instance.document_number.starts_with("INTAKE-"));
        assert_eq!(generated.instance.document_title, "Intake Form - Kickoff");
        assert!(generated.instance.can_be_signed());

        let artifact = generated.instance.artifact.as_ref().unwrap();
        assert_eq!(store.get(&artifact.path).unwrap(), generated.bytes);

        let events = audit.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, "document_generated");
    }

    #[test]
    fn generate_title_includes_project_name() {
        let (engine, _, _) = engine_with_sinks();
        let project = Project::new("Pilot Site", "PROJ-2026-001", "Hillside School");
        let data = json!({"title": "Kickoff", "client_name": "Hillside School"})
            .as_object()
            .unwrap()
            .clone();

        let generated = engine
            .generate(&registry(), "Intake Form", data, None, Some(&project), None)
            .unwrap();
        assert_eq!(
            generated.instance.document_title,
            "Intake Form - Kickoff - Pilot Site"
        );
        assert_eq!(generated.instance.project_id, Some(project.id));
    }

    #[test]
    fn missing_required_field_aborts_before_any_write() {
        let (engine, store, audit) = engine_with_sinks();
        let data = json!({}).as_object().unwrap().clone();

        let err = engine
            .generate(&registry(), "Intake Form", data, None, None, None)
            .unwrap_err();
        match err {
            DocumentError::ValidationFailed { missing_fields, .. } => {
                assert_eq!(missing_fields, vec!["title", "client_name"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(store.is_empty());
        assert!(audit.events().is_empty());
    }

    #[test]
    fn unknown_template_is_not_found() {
        let (engine, _, _) = engine_with_sinks();
        let err = engine
            .generate(
                &registry(),
                "No Such Template",
                Map::new(),
                None,
                None,
                None,
            )
            .unwrap_err();
        assert!(matches!(err, DocumentError::TemplateNotFound(_)));
    }

    #[test]
    fn renderer_failure_is_wrapped_with_context() {
        struct FailingRenderer;
        impl Renderer for FailingRenderer {
            fn render(&self, _: &str, _: &RenderContext) -> Result<Vec<u8>, RenderError> {
                Err(RenderError::new("engine exploded"))
            }
        }

        let engine = DocumentEngine::new(
            Arc::new(FailingRenderer),
            Arc::new(MemoryArtifactStore::new()),
        );
        let data = json!({"title": "Kickoff", "client_name": "Hillside School"})
            .as_object()
            .unwrap()
            .clone();

        let err = engine
            .generate(&registry(), "Intake Form", data, None, None, None)
            .unwrap_err();
        match err {
            DocumentError::RenderFailed {
                template, source, ..
            } => {
                assert_eq!(template, "Intake Form");
                assert_eq!(source.to_string(), "engine exploded");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn audited_copy_lands_in_audit_area() {
        let (engine, store, audit) = engine_with_sinks();
        let metadata = json!({"template_type": "CHANGE"})
            .as_object()
            .unwrap()
            .clone();

        let path = engine.store_audited_copy(b"copy", &metadata, None).unwrap();
        assert!(path.starts_with("documents/audit/audit_"));
        assert!(path.ends_with("_CHANGE.pdf"));
        assert_eq!(store.get(&path).unwrap(), b"copy");
        assert_eq!(audit.events()[0].event_type, "document_stored");
    }

    #[test]
    fn complexity_tiers_and_slas() {
        assert_eq!(
            DocumentComplexity::classify(10_000),
            DocumentComplexity::Simple
        );
        assert_eq!(
            DocumentComplexity::classify(50_000),
            DocumentComplexity::Standard
        );
        assert_eq!(
            DocumentComplexity::classify(200_000),
            DocumentComplexity::Complex
        );
        assert_eq!(DocumentComplexity::Simple.sla(), Duration::from_secs(3));
        assert_eq!(DocumentComplexity::LowEnd.sla(), Duration::from_secs(12));
    }
}
