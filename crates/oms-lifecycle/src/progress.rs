//! Phase-based progress calculation
//!
//! Distinct from the status→progress mapping: when a project has phases,
//! a finer-grained estimate blends phase completion with document
//! completion. This signal is informational — it never drives status.

use crate::{progress_for, transition, LifecycleResult, TransitionLog};
use oms_types::{Actor, Project, ProjectStatus};
use serde::{Deserialize, Serialize};

/// Status of one project phase, as far as progress accounting cares.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseStatus {
    NotStarted,
    InProgress,
    Review,
    Completed,
    OnHold,
    Cancelled,
}

/// Review state of a project deliverable document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliverableStatus {
    Draft,
    InReview,
    Final,
    ClientApproved,
}

impl DeliverableStatus {
    fn is_complete(self) -> bool {
        matches!(self, DeliverableStatus::Final | DeliverableStatus::ClientApproved)
    }
}

/// Calculate progress from phases and deliverable documents.
///
/// No phases: fall back to the status mapping (0 for `on_hold`). With
/// phases: `completed/total * 100`, blended 70/30 with the completed
/// document fraction when any documents exist. Clamped to 0..=100 and
/// truncated to an integer.
pub fn calculate_progress(
    project: &Project,
    phases: &[PhaseStatus],
    documents: &[DeliverableStatus],
) -> u8 {
    if phases.is_empty() {
        return progress_for(project.status).unwrap_or(0);
    }

    let total_phases = phases.len() as f64;
    let completed_phases = phases
        .iter()
        .filter(|p| **p == PhaseStatus::Completed)
        .count() as f64;
    let phase_progress = completed_phases / total_phases * 100.0;

    let overall = if documents.is_empty() {
        phase_progress
    } else {
        let total_docs = documents.len() as f64;
        let completed_docs = documents.iter().filter(|d| d.is_complete()).count() as f64;
        let doc_progress = completed_docs / total_docs * 100.0;
        phase_progress * 0.7 + doc_progress * 0.3
    };

    overall.clamp(0.0, 100.0) as u8
}

/// Write the calculated progress onto the project when it differs.
pub fn update_progress(
    project: &mut Project,
    phases: &[PhaseStatus],
    documents: &[DeliverableStatus],
) {
    let new_progress = calculate_progress(project, phases, documents);
    if new_progress != project.progress_percentage {
        project.progress_percentage = new_progress;
        project.status_updated_at = chrono::Utc::now();
        project.timestamps.touch();
    }
}

/// Convenience wrapper pairing a project with its transition log.
///
/// Callers that hold both can use the free functions directly; this exists
/// for orchestration code that threads one audited project around.
#[derive(Clone, Debug, Default)]
pub struct ProjectLifecycle {
    pub log: TransitionLog,
}

impl ProjectLifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    /// See [`transition`].
    pub fn transition(
        &mut self,
        project: &mut Project,
        new_status: ProjectStatus,
        actor: Option<&Actor>,
        reason: impl Into<String>,
        notes: impl Into<String>,
    ) -> LifecycleResult<crate::StatusTransition> {
        transition(project, new_status, actor, reason, notes, &mut self.log)
    }
}
