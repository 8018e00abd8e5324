//! Repository for projects.

use async_trait::async_trait;
use blueprint_core::roles::MemberRole;
use blueprint_core::workflow::WorkflowState;
use chrono::Utc;

use crate::error::StoreError;
use crate::memory::{MemoryStore, MEMBER_PREFIX, PROJECT_PREFIX};
use crate::models::project::{CreateProject, Project, UpdateProject};
use crate::models::team_member::TeamMember;

#[async_trait]
pub trait ProjectRepo: Send + Sync {
    /// Insert a new `draft` project together with its owner team member.
    async fn create(&self, input: &CreateProject) -> Result<Project, StoreError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Project>, StoreError>;

    /// List all projects, most recently created first.
    async fn list(&self) -> Result<Vec<Project>, StoreError>;

    async fn count(&self) -> Result<usize, StoreError>;

    /// Update name and idea text. Only non-`None` fields are applied.
    ///
    /// Returns `None` if no project with the given `id` exists.
    async fn update(&self, id: &str, input: &UpdateProject) -> Result<Option<Project>, StoreError>;

    /// Compare-and-set the workflow status.
    ///
    /// Fails with [`StoreError::Conflict`] when the stored status is not
    /// `expected`. Returns `None` if the project does not exist.
    async fn update_status(
        &self,
        id: &str,
        expected: WorkflowState,
        next: WorkflowState,
    ) -> Result<Option<Project>, StoreError>;

    /// Reset to `draft` from any status, dropping extracted items, questions
    /// and the plan. Returns `None` if the project does not exist.
    async fn restart(&self, id: &str) -> Result<Option<Project>, StoreError>;

    /// Delete a project and everything that belongs to it.
    ///
    /// Returns `true` if a project was removed.
    async fn delete(&self, id: &str) -> Result<bool, StoreError>;
}

#[async_trait]
impl ProjectRepo for MemoryStore {
    async fn create(&self, input: &CreateProject) -> Result<Project, StoreError> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let project = Project {
            id: tables.next_id(PROJECT_PREFIX),
            name: input.name.clone(),
            idea_text: input.idea_text.clone(),
            status: WorkflowState::Draft,
            user_id: input.owner.user_id.clone(),
            created_at: now,
            updated_at: now,
        };
        let owner = TeamMember {
            id: tables.next_id(MEMBER_PREFIX),
            project_id: project.id.clone(),
            user_id: input.owner.user_id.clone(),
            full_name: input.owner.full_name.clone(),
            email: input.owner.email.clone(),
            role: MemberRole::Owner,
            added_at: now,
        };
        tables.projects.push(project.clone());
        tables.members.push(owner);
        Ok(project)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Project>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.projects.iter().find(|p| p.id == id).cloned())
    }

    async fn list(&self) -> Result<Vec<Project>, StoreError> {
        let tables = self.tables.read().await;
        // Insertion order is creation order; ties on `created_at` keep it.
        Ok(tables.projects.iter().rev().cloned().collect())
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.tables.read().await.projects.len())
    }

    async fn update(&self, id: &str, input: &UpdateProject) -> Result<Option<Project>, StoreError> {
        let mut tables = self.tables.write().await;
        let Some(project) = tables.projects.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        if let Some(name) = &input.name {
            project.name = name.clone();
        }
        if let Some(idea_text) = &input.idea_text {
            project.idea_text = idea_text.clone();
        }
        project.updated_at = Utc::now();
        Ok(Some(project.clone()))
    }

    async fn update_status(
        &self,
        id: &str,
        expected: WorkflowState,
        next: WorkflowState,
    ) -> Result<Option<Project>, StoreError> {
        let mut tables = self.tables.write().await;
        let Some(project) = tables.projects.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        if project.status != expected {
            return Err(StoreError::Conflict(format!(
                "Project {id} is {}, expected {expected}",
                project.status
            )));
        }
        project.status = next;
        project.updated_at = Utc::now();
        Ok(Some(project.clone()))
    }

    async fn restart(&self, id: &str) -> Result<Option<Project>, StoreError> {
        let mut tables = self.tables.write().await;
        let Some(project) = tables.projects.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        project.status = WorkflowState::Draft;
        project.updated_at = Utc::now();
        let project = project.clone();
        let removed = tables.clear_workflow_output(id);
        tracing::debug!(project_id = %id, removed, "Cleared workflow output");
        Ok(Some(project))
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        if !tables.project_exists(id) {
            return Ok(false);
        }
        tables.projects.retain(|p| p.id != id);
        tables.clear_workflow_output(id);
        tables.members.retain(|m| m.project_id != id);
        tables.documents.retain(|d| d.project_id != id);
        Ok(true)
    }
}
