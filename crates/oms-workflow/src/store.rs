//! In-memory workflow store
//!
//! Owns the workflow records and enforces cross-record rules the overlay
//! types cannot see on their own, most notably the one-acceptance-per-
//! project constraint. Creation through the store is atomic: the record
//! and its backing document either both exist or neither does.

use crate::{
    ChangeRequest, CreateAcceptance, CreateChangeRequest, CreateHandover, PilotAcceptance,
    PilotHandover, WorkflowError, WorkflowResult,
};
use oms_document::{DocumentEngine, TemplateRegistry};
use oms_types::{Actor, Project, ProjectId, WorkflowId};
use std::collections::HashMap;

#[derive(Default)]
pub struct WorkflowStore {
    change_requests: HashMap<WorkflowId, ChangeRequest>,
    acceptances: HashMap<WorkflowId, PilotAcceptance>,
    handovers: HashMap<WorkflowId, PilotHandover>,
    acceptance_by_project: HashMap<ProjectId, WorkflowId>,
}

impl WorkflowStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_change_request(
        &mut self,
        project: &Project,
        request: CreateChangeRequest,
        actor: &Actor,
        registry: &TemplateRegistry,
        engine: &DocumentEngine,
    ) -> WorkflowResult<WorkflowId> {
        let record = ChangeRequest::create(project, request, actor, registry, engine)?;
        let id = record.id;
        self.change_requests.insert(id, record);
        Ok(id)
    }

    /// Create an acceptance record, enforcing the 1:1 rule per project.
    pub fn create_acceptance(
        &mut self,
        project: &Project,
        request: CreateAcceptance,
        actor: &Actor,
        registry: &TemplateRegistry,
        engine: &DocumentEngine,
    ) -> WorkflowResult<WorkflowId> {
        if self.acceptance_by_project.contains_key(&project.id) {
            return Err(WorkflowError::AcceptanceExists(project.id));
        }
        let record = PilotAcceptance::create(project, request, actor, registry, engine)?;
        let id = record.id;
        self.acceptance_by_project.insert(project.id, id);
        self.acceptances.insert(id, record);
        Ok(id)
    }

    pub fn create_handover(
        &mut self,
        project: &Project,
        request: CreateHandover,
        actor: &Actor,
        registry: &TemplateRegistry,
        engine: &DocumentEngine,
    ) -> WorkflowResult<WorkflowId> {
        let record = PilotHandover::create(project, request, actor, registry, engine)?;
        let id = record.id;
        self.handovers.insert(id, record);
        Ok(id)
    }

    pub fn change_request(&self, id: WorkflowId) -> WorkflowResult<&ChangeRequest> {
        self.change_requests
            .get(&id)
            .ok_or(WorkflowError::RecordNotFound(id))
    }

    pub fn change_request_mut(&mut self, id: WorkflowId) -> WorkflowResult<&mut ChangeRequest> {
        self.change_requests
            .get_mut(&id)
            .ok_or(WorkflowError::RecordNotFound(id))
    }

    pub fn acceptance(&self, id: WorkflowId) -> WorkflowResult<&PilotAcceptance> {
        self.acceptances
            .get(&id)
            .ok_or(WorkflowError::RecordNotFound(id))
    }

    pub fn acceptance_mut(&mut self, id: WorkflowId) -> WorkflowResult<&mut PilotAcceptance> {
        self.acceptances
            .get_mut(&id)
            .ok_or(WorkflowError::RecordNotFound(id))
    }

    pub fn handover(&self, id: WorkflowId) -> WorkflowResult<&PilotHandover> {
        self.handovers
            .get(&id)
            .ok_or(WorkflowError::RecordNotFound(id))
    }

    pub fn handover_mut(&mut self, id: WorkflowId) -> WorkflowResult<&mut PilotHandover> {
        self.handovers
            .get_mut(&id)
            .ok_or(WorkflowError::RecordNotFound(id))
    }

    pub fn acceptance_for_project(&self, project_id: ProjectId) -> Option<&PilotAcceptance> {
        self.acceptance_by_project
            .get(&project_id)
            .and_then(|id| self.acceptances.get(id))
    }

    pub fn change_requests_for_project(&self, project_id: ProjectId) -> Vec<&ChangeRequest> {
        self.change_requests
            .values()
            .filter(|r| r.project_id == project_id)
            .collect()
    }

    pub fn handovers_for_project(&self, project_id: ProjectId) -> Vec<&PilotHandover> {
        self.handovers
            .values()
            .filter(|r| r.project_id == project_id)
            .collect()
    }
}
