//! Status graph plumbing shared by the overlay state machines

use crate::{WorkflowError, WorkflowResult};
use oms_types::{Project, ProjectStatus};

/// A workflow-local status enum with an explicit edge list.
///
/// Each overlay carries its own small graph; edges reachable only through a
/// dedicated operation (impact assessment, review submission, approval
/// decision) are left out of `allowed_targets` so the generic transition
/// path cannot bypass their gates.
pub trait WorkflowStatus: Copy + PartialEq + 'static {
    fn as_str(self) -> &'static str;
    fn allowed_targets(self) -> &'static [Self];
}

/// Check `from → to` against the edge list.
pub(crate) fn guard_transition<S: WorkflowStatus>(from: S, to: S) -> WorkflowResult<()> {
    let allowed = from.allowed_targets();
    if allowed.contains(&to) {
        Ok(())
    } else {
        Err(WorkflowError::InvalidStatusTransition {
            from: from.as_str(),
            to: to.as_str(),
            allowed: allowed.iter().map(|s| s.as_str()).collect(),
        })
    }
}

/// Check the project-status precondition for creating a workflow record.
pub(crate) fn guard_project_status(
    project: &Project,
    allowed: &'static [ProjectStatus],
) -> WorkflowResult<()> {
    if allowed.contains(&project.status) {
        Ok(())
    } else {
        Err(WorkflowError::ProjectNotEligible {
            status: project.status,
            allowed,
        })
    }
}
