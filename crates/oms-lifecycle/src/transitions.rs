//! Status transitions: the allowed-edge graph and the audited executor

use crate::{LifecycleError, LifecycleResult};
use chrono::{DateTime, Utc};
use oms_types::{Actor, Project, ProjectStatus, TransitionId, UserId};
use serde::{Deserialize, Serialize};

use ProjectStatus::*;

/// Legal targets from each status.
///
/// This is an adjacency list, not a total order: `completed` can only fall
/// back to `client_review`, and `on_hold` can resume anywhere except
/// `completed`.
pub fn allowed_targets(from: ProjectStatus) -> &'static [ProjectStatus] {
    match from {
        Lead => &[Quoted, OnHold],
        Quoted => &[Lead, Approved, OnHold],
        Approved => &[Quoted, Planning, OnHold],
        Planning => &[Approved, Development, OnHold],
        Development => &[Planning, Testing, OnHold],
        Testing => &[Development, ClientReview, OnHold],
        ClientReview => &[Testing, Completed, OnHold],
        Completed => &[ClientReview],
        OnHold => &[
            Lead,
            Quoted,
            Approved,
            Planning,
            Development,
            Testing,
            ClientReview,
        ],
    }
}

/// Progress percentage a status maps to. `on_hold` has no mapping: progress
/// is frozen while a project is on hold.
pub fn progress_for(status: ProjectStatus) -> Option<u8> {
    match status {
        Lead => Some(0),
        Quoted => Some(5),
        Approved => Some(10),
        Planning => Some(20),
        Development => Some(50),
        Testing => Some(80),
        ClientReview => Some(95),
        Completed => Some(100),
        OnHold => None,
    }
}

/// Check that `from → to` is a legal edge. A same-state transition is
/// always valid.
pub fn validate_transition(from: ProjectStatus, to: ProjectStatus) -> LifecycleResult<()> {
    if from == to {
        return Ok(());
    }
    let allowed = allowed_targets(from);
    if allowed.contains(&to) {
        Ok(())
    } else {
        Err(LifecycleError::InvalidTransition { from, to, allowed })
    }
}

/// One audited status change. Immutable once created.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StatusTransition {
    pub id: TransitionId,
    pub project_id: oms_types::ProjectId,
    pub from_status: ProjectStatus,
    pub to_status: ProjectStatus,
    pub actor: Option<UserId>,
    pub reason: String,
    pub notes: String,
    pub timestamp: DateTime<Utc>,
}

/// Append-only audit trail of status transitions.
///
/// There is deliberately no mutation or removal API; rows accumulate for
/// the life of the project.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TransitionLog {
    entries: Vec<StatusTransition>,
}

impl TransitionLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn append(&mut self, transition: StatusTransition) {
        self.entries.push(transition);
    }

    pub fn entries(&self) -> &[StatusTransition] {
        &self.entries
    }

    /// Transitions for one project, oldest first.
    pub fn for_project(&self, project_id: oms_types::ProjectId) -> Vec<&StatusTransition> {
        self.entries
            .iter()
            .filter(|t| t.project_id == project_id)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Transition a project to `new_status` with a full audit trail.
///
/// Validate-then-mutate: on a rejected edge nothing changes — no status,
/// no progress, no audit row. On success the project's status, mapped
/// progress, and status timestamp change together with exactly one
/// appended audit row.
pub fn transition(
    project: &mut Project,
    new_status: ProjectStatus,
    actor: Option<&Actor>,
    reason: impl Into<String>,
    notes: impl Into<String>,
    log: &mut TransitionLog,
) -> LifecycleResult<StatusTransition> {
    let old_status = project.status;
    validate_transition(old_status, new_status)?;

    project.status = new_status;
    if let Some(progress) = progress_for(new_status) {
        if old_status != new_status {
            project.progress_percentage = progress;
        }
    }
    project.status_updated_at = Utc::now();
    project.timestamps.touch();

    let record = StatusTransition {
        id: TransitionId::new(),
        project_id: project.id,
        from_status: old_status,
        to_status: new_status,
        actor: actor.map(|a| a.id),
        reason: reason.into(),
        notes: notes.into(),
        timestamp: project.status_updated_at,
    };
    log.append(record.clone());

    tracing::info!(
        project = %project.project_code,
        from = %old_status,
        to = %new_status,
        progress = project.progress_percentage,
        "project status transitioned"
    );

    Ok(record)
}
