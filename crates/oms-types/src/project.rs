//! Projects and their lifecycle status enum
//!
//! A project moves through a fixed 9-state lifecycle. The allowed edges and
//! the status→progress mapping live in `oms-lifecycle`; this module only
//! defines the record and the enum so document and workflow crates can gate
//! on status without depending on the state machine.

use crate::{ProjectId, Timestamps};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Project lifecycle status.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Lead,
    Quoted,
    Approved,
    Planning,
    Development,
    Testing,
    ClientReview,
    Completed,
    OnHold,
}

impl ProjectStatus {
    /// All statuses, in lifecycle order.
    pub const ALL: [ProjectStatus; 9] = [
        ProjectStatus::Lead,
        ProjectStatus::Quoted,
        ProjectStatus::Approved,
        ProjectStatus::Planning,
        ProjectStatus::Development,
        ProjectStatus::Testing,
        ProjectStatus::ClientReview,
        ProjectStatus::Completed,
        ProjectStatus::OnHold,
    ];

    /// Human-readable label, used when flattening payloads for rendering.
    pub fn display_label(self) -> &'static str {
        match self {
            ProjectStatus::Lead => "Lead",
            ProjectStatus::Quoted => "Quoted",
            ProjectStatus::Approved => "Approved",
            ProjectStatus::Planning => "Planning",
            ProjectStatus::Development => "Development",
            ProjectStatus::Testing => "Testing",
            ProjectStatus::ClientReview => "Client Review",
            ProjectStatus::Completed => "Completed",
            ProjectStatus::OnHold => "On Hold",
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ProjectStatus::Lead => "lead",
            ProjectStatus::Quoted => "quoted",
            ProjectStatus::Approved => "approved",
            ProjectStatus::Planning => "planning",
            ProjectStatus::Development => "development",
            ProjectStatus::Testing => "testing",
            ProjectStatus::ClientReview => "client_review",
            ProjectStatus::Completed => "completed",
            ProjectStatus::OnHold => "on_hold",
        };
        f.write_str(s)
    }
}

/// A service-delivery project for a client.
///
/// `status` and `progress_percentage` are mutated only through the
/// lifecycle state machine.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub project_name: String,
    /// Internal code, e.g. `PROJ-2026-001`.
    pub project_code: String,
    /// Client organization name (denormalized for document rendering).
    pub client_name: String,
    pub status: ProjectStatus,
    /// 0..=100, driven by the status mapping or phase-based calculation.
    pub progress_percentage: u8,
    pub status_updated_at: DateTime<Utc>,
    pub start_date: Option<NaiveDate>,
    pub timestamps: Timestamps,
}

impl Project {
    pub fn new(
        project_name: impl Into<String>,
        project_code: impl Into<String>,
        client_name: impl Into<String>,
    ) -> Self {
        Self {
            id: ProjectId::new(),
            project_name: project_name.into(),
            project_code: project_code.into(),
            client_name: client_name.into(),
            status: ProjectStatus::Lead,
            progress_percentage: 0,
            status_updated_at: Utc::now(),
            start_date: None,
            timestamps: Timestamps::now(),
        }
    }

    pub fn with_status(mut self, status: ProjectStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_start_date(mut self, date: NaiveDate) -> Self {
        self.start_date = Some(date);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_wire_names_are_snake_case() {
        assert_eq!(
            serde_json::to_string(&ProjectStatus::ClientReview).unwrap(),
            "\"client_review\""
        );
        assert_eq!(ProjectStatus::OnHold.to_string(), "on_hold");
    }

    #[test]
    fn new_project_starts_as_lead() {
        let p = Project::new("Pilot Site", "PROJ-2026-001", "Hillside School");
        assert_eq!(p.status, ProjectStatus::Lead);
        assert_eq!(p.progress_percentage, 0);
    }
}
