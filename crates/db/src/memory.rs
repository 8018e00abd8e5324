//! In-memory table storage behind every repository trait.
//!
//! All tables live behind one [`tokio::sync::RwLock`], so each repository
//! call observes and mutates a consistent snapshot. Rows are kept in insertion
//! order; ids are `<prefix>_<n>` with a counter per prefix that never reuses
//! a value, even after deletes.

use std::collections::HashMap;

use blueprint_core::types::EntityId;
use blueprint_core::workflow::WorkflowState;
use tokio::sync::RwLock;

use crate::error::StoreError;

use crate::models::document::Document;
use crate::models::extracted_item::ExtractedItem;
use crate::models::plan::{Phase, Task};
use crate::models::project::Project;
use crate::models::question::Question;
use crate::models::team_member::TeamMember;
use crate::models::user::User;

pub(crate) const PROJECT_PREFIX: &str = "project";
pub(crate) const ITEM_PREFIX: &str = "item";
pub(crate) const QUESTION_PREFIX: &str = "question";
pub(crate) const PHASE_PREFIX: &str = "phase";
pub(crate) const TASK_PREFIX: &str = "task";
pub(crate) const MEMBER_PREFIX: &str = "member";
pub(crate) const DOCUMENT_PREFIX: &str = "document";
pub(crate) const USER_PREFIX: &str = "user";

#[derive(Debug, Default)]
pub(crate) struct Tables {
    pub projects: Vec<Project>,
    pub items: Vec<ExtractedItem>,
    pub questions: Vec<Question>,
    pub phases: Vec<Phase>,
    pub tasks: Vec<Task>,
    pub members: Vec<TeamMember>,
    pub documents: Vec<Document>,
    pub users: Vec<User>,
    sequences: HashMap<&'static str, u64>,
}

impl Tables {
    pub fn next_id(&mut self, prefix: &'static str) -> EntityId {
        let counter = self.sequences.entry(prefix).or_insert(0);
        *counter += 1;
        format!("{prefix}_{counter}")
    }

    pub fn project_exists(&self, id: &str) -> bool {
        self.projects.iter().any(|p| p.id == id)
    }

    /// Fail unless the project exists and is in `expected`.
    ///
    /// Writes of workflow output check this under the same lock, so output
    /// computed for a project that was restarted meanwhile is dropped.
    pub fn require_status(&self, id: &str, expected: WorkflowState) -> Result<(), StoreError> {
        let Some(project) = self.projects.iter().find(|p| p.id == id) else {
            return Err(StoreError::Integrity(format!("Project {id} does not exist")));
        };
        if project.status != expected {
            return Err(StoreError::Conflict(format!(
                "Project {id} is {}, expected {expected}",
                project.status
            )));
        }
        Ok(())
    }

    /// Drop the workflow output of a project (items, questions, plan).
    /// Team members and documents are kept.
    pub fn clear_workflow_output(&mut self, project_id: &str) -> usize {
        let before = self.items.len() + self.questions.len() + self.phases.len() + self.tasks.len();
        self.items.retain(|i| i.project_id != project_id);
        self.questions.retain(|q| q.project_id != project_id);
        self.phases.retain(|p| p.project_id != project_id);
        self.tasks.retain(|t| t.project_id != project_id);
        before - (self.items.len() + self.questions.len() + self.phases.len() + self.tasks.len())
    }

    /// Remove `task_ids` and every reference to them from remaining tasks.
    pub fn remove_tasks(&mut self, task_ids: &[EntityId]) {
        self.tasks.retain(|t| !task_ids.contains(&t.id));
        for task in &mut self.tasks {
            task.depends_on.retain(|d| !task_ids.contains(d));
        }
    }
}

/// The process-wide in-memory store. Reset on restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    pub(crate) tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}
