//! Repository for plan phases and tasks.
//!
//! Index uniqueness and dependency rules are checked under the store's write
//! lock, so concurrent edits cannot leave a duplicate index or a cycle behind.

use std::collections::BTreeMap;

use async_trait::async_trait;
use blueprint_core::planning::{
    next_index, validate_dependencies, validate_duration, validate_index, PhaseDraft,
    MIN_DURATION_DAYS,
};
use blueprint_core::types::EntityId;
use blueprint_core::workflow::WorkflowState;
use chrono::Utc;

use crate::error::StoreError;
use crate::memory::{MemoryStore, Tables, PHASE_PREFIX, TASK_PREFIX};
use crate::models::plan::{
    CreatePhase, CreateTask, Phase, PhaseWithTasks, Task, UpdatePhase, UpdateTask,
};

#[async_trait]
pub trait PlanRepo: Send + Sync {
    /// Phases of a project ordered by `idx`, each with its tasks ordered by `idx`.
    async fn list_by_project(&self, project_id: &str) -> Result<Vec<PhaseWithTasks>, StoreError>;

    async fn find_phase(&self, id: &str) -> Result<Option<Phase>, StoreError>;

    async fn find_task(&self, id: &str) -> Result<Option<Task>, StoreError>;

    async fn create_phase(&self, project_id: &str, input: &CreatePhase) -> Result<Phase, StoreError>;

    async fn update_phase(&self, id: &str, input: &UpdatePhase) -> Result<Option<Phase>, StoreError>;

    /// Delete a phase with its tasks. References to those tasks are removed
    /// from the remaining tasks.
    async fn delete_phase(&self, id: &str) -> Result<bool, StoreError>;

    /// Create a task in `phase_id`. Returns `None` if the phase does not exist.
    async fn create_task(&self, phase_id: &str, input: &CreateTask) -> Result<Option<Task>, StoreError>;

    async fn update_task(&self, id: &str, input: &UpdateTask) -> Result<Option<Task>, StoreError>;

    /// Delete a task and drop it from every other task's `depends_on`.
    async fn delete_task(&self, id: &str) -> Result<bool, StoreError>;

    /// Replace the whole plan of a project with a generated outline.
    ///
    /// Fails with [`StoreError::Conflict`] unless the project is in
    /// `expected`.
    async fn replace_plan(
        &self,
        project_id: &str,
        expected: WorkflowState,
        outline: &[PhaseDraft],
    ) -> Result<Vec<PhaseWithTasks>, StoreError>;
}

fn dependency_graph(tables: &Tables, project_id: &str) -> BTreeMap<EntityId, Vec<EntityId>> {
    tables
        .tasks
        .iter()
        .filter(|t| t.project_id == project_id)
        .map(|t| (t.id.clone(), t.depends_on.clone()))
        .collect()
}

fn phase_idx_taken(tables: &Tables, project_id: &str, idx: i32, except: Option<&str>) -> bool {
    tables
        .phases
        .iter()
        .any(|p| p.project_id == project_id && p.idx == idx && Some(p.id.as_str()) != except)
}

fn task_idx_taken(tables: &Tables, phase_id: &str, idx: i32, except: Option<&str>) -> bool {
    tables
        .tasks
        .iter()
        .any(|t| t.phase_id == phase_id && t.idx == idx && Some(t.id.as_str()) != except)
}

fn collect_plan(tables: &Tables, project_id: &str) -> Vec<PhaseWithTasks> {
    let mut phases: Vec<PhaseWithTasks> = tables
        .phases
        .iter()
        .filter(|p| p.project_id == project_id)
        .map(|phase| {
            let mut tasks: Vec<Task> = tables
                .tasks
                .iter()
                .filter(|t| t.phase_id == phase.id)
                .cloned()
                .collect();
            tasks.sort_by_key(|t| t.idx);
            PhaseWithTasks {
                phase: phase.clone(),
                tasks,
            }
        })
        .collect();
    phases.sort_by_key(|p| p.phase.idx);
    phases
}

/// Every outline dependency must point at an earlier task.
fn check_outline(outline: &[PhaseDraft]) -> Result<(), StoreError> {
    for (p, phase) in outline.iter().enumerate() {
        for (t, task) in phase.tasks.iter().enumerate() {
            for dep in &task.depends_on {
                let exists = outline
                    .get(dep.phase)
                    .is_some_and(|target| dep.task < target.tasks.len());
                if !exists || (dep.phase, dep.task) >= (p, t) {
                    return Err(StoreError::Integrity(format!(
                        "Outline task ({p}, {t}) depends on ({}, {})",
                        dep.phase, dep.task
                    )));
                }
            }
        }
    }
    Ok(())
}

#[async_trait]
impl PlanRepo for MemoryStore {
    async fn list_by_project(&self, project_id: &str) -> Result<Vec<PhaseWithTasks>, StoreError> {
        let tables = self.tables.read().await;
        Ok(collect_plan(&tables, project_id))
    }

    async fn find_phase(&self, id: &str) -> Result<Option<Phase>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.phases.iter().find(|p| p.id == id).cloned())
    }

    async fn find_task(&self, id: &str) -> Result<Option<Task>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.tasks.iter().find(|t| t.id == id).cloned())
    }

    async fn create_phase(&self, project_id: &str, input: &CreatePhase) -> Result<Phase, StoreError> {
        let mut tables = self.tables.write().await;
        if !tables.project_exists(project_id) {
            return Err(StoreError::Integrity(format!(
                "Cannot add a phase to missing project {project_id}"
            )));
        }
        let idx = match input.idx {
            Some(idx) => {
                validate_index(idx)?;
                if phase_idx_taken(&tables, project_id, idx, None) {
                    return Err(StoreError::Conflict(format!(
                        "Phase index {idx} is already used in this project"
                    )));
                }
                idx
            }
            None => next_index(
                tables
                    .phases
                    .iter()
                    .filter(|p| p.project_id == project_id)
                    .map(|p| p.idx),
            ),
        };
        let now = Utc::now();
        let phase = Phase {
            id: tables.next_id(PHASE_PREFIX),
            project_id: project_id.to_string(),
            idx,
            title: input.title.trim().to_string(),
            description: input.description.clone().unwrap_or_default(),
            created_at: now,
            updated_at: now,
        };
        tables.phases.push(phase.clone());
        Ok(phase)
    }

    async fn update_phase(&self, id: &str, input: &UpdatePhase) -> Result<Option<Phase>, StoreError> {
        let mut tables = self.tables.write().await;
        let Some(project_id) = tables
            .phases
            .iter()
            .find(|p| p.id == id)
            .map(|p| p.project_id.clone())
        else {
            return Ok(None);
        };
        if let Some(idx) = input.idx {
            validate_index(idx)?;
            if phase_idx_taken(&tables, &project_id, idx, Some(id)) {
                return Err(StoreError::Conflict(format!(
                    "Phase index {idx} is already used in this project"
                )));
            }
        }

        let Some(phase) = tables.phases.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        if let Some(title) = &input.title {
            phase.title = title.trim().to_string();
        }
        if let Some(description) = &input.description {
            phase.description = description.clone();
        }
        if let Some(idx) = input.idx {
            phase.idx = idx;
        }
        phase.updated_at = Utc::now();
        Ok(Some(phase.clone()))
    }

    async fn delete_phase(&self, id: &str) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        if !tables.phases.iter().any(|p| p.id == id) {
            return Ok(false);
        }
        tables.phases.retain(|p| p.id != id);
        let task_ids: Vec<EntityId> = tables
            .tasks
            .iter()
            .filter(|t| t.phase_id == id)
            .map(|t| t.id.clone())
            .collect();
        tables.remove_tasks(&task_ids);
        Ok(true)
    }

    async fn create_task(&self, phase_id: &str, input: &CreateTask) -> Result<Option<Task>, StoreError> {
        let mut tables = self.tables.write().await;
        let Some(project_id) = tables
            .phases
            .iter()
            .find(|p| p.id == phase_id)
            .map(|p| p.project_id.clone())
        else {
            return Ok(None);
        };

        let duration_days = input.duration_days.unwrap_or(MIN_DURATION_DAYS);
        validate_duration(duration_days)?;
        let idx = match input.idx {
            Some(idx) => {
                validate_index(idx)?;
                if task_idx_taken(&tables, phase_id, idx, None) {
                    return Err(StoreError::Conflict(format!(
                        "Task index {idx} is already used in this phase"
                    )));
                }
                idx
            }
            None => next_index(
                tables
                    .tasks
                    .iter()
                    .filter(|t| t.phase_id == phase_id)
                    .map(|t| t.idx),
            ),
        };

        let id = tables.next_id(TASK_PREFIX);
        validate_dependencies(&id, &input.depends_on, &dependency_graph(&tables, &project_id))?;

        let now = Utc::now();
        let task = Task {
            id,
            project_id,
            phase_id: phase_id.to_string(),
            idx,
            title: input.title.trim().to_string(),
            description: input.description.clone().unwrap_or_default(),
            duration_days,
            depends_on: input.depends_on.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.tasks.push(task.clone());
        Ok(Some(task))
    }

    async fn update_task(&self, id: &str, input: &UpdateTask) -> Result<Option<Task>, StoreError> {
        let mut tables = self.tables.write().await;
        let Some((project_id, phase_id)) = tables
            .tasks
            .iter()
            .find(|t| t.id == id)
            .map(|t| (t.project_id.clone(), t.phase_id.clone()))
        else {
            return Ok(None);
        };

        if let Some(days) = input.duration_days {
            validate_duration(days)?;
        }
        if let Some(idx) = input.idx {
            validate_index(idx)?;
            if task_idx_taken(&tables, &phase_id, idx, Some(id)) {
                return Err(StoreError::Conflict(format!(
                    "Task index {idx} is already used in this phase"
                )));
            }
        }
        if let Some(depends_on) = &input.depends_on {
            validate_dependencies(id, depends_on, &dependency_graph(&tables, &project_id))?;
        }

        let Some(task) = tables.tasks.iter_mut().find(|t| t.id == id) else {
            return Ok(None);
        };
        if let Some(title) = &input.title {
            task.title = title.trim().to_string();
        }
        if let Some(description) = &input.description {
            task.description = description.clone();
        }
        if let Some(days) = input.duration_days {
            task.duration_days = days;
        }
        if let Some(depends_on) = &input.depends_on {
            task.depends_on = depends_on.clone();
        }
        if let Some(idx) = input.idx {
            task.idx = idx;
        }
        task.updated_at = Utc::now();
        Ok(Some(task.clone()))
    }

    async fn delete_task(&self, id: &str) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        if !tables.tasks.iter().any(|t| t.id == id) {
            return Ok(false);
        }
        tables.remove_tasks(&[id.to_string()]);
        Ok(true)
    }

    async fn replace_plan(
        &self,
        project_id: &str,
        expected: WorkflowState,
        outline: &[PhaseDraft],
    ) -> Result<Vec<PhaseWithTasks>, StoreError> {
        let mut tables = self.tables.write().await;
        tables.require_status(project_id, expected)?;
        check_outline(outline)?;
        tables.phases.retain(|p| p.project_id != project_id);
        tables.tasks.retain(|t| t.project_id != project_id);

        let now = Utc::now();
        // Ids of already inserted tasks, indexed like the outline.
        let mut task_ids: Vec<Vec<EntityId>> = Vec::with_capacity(outline.len());
        for (p, draft) in outline.iter().enumerate() {
            let phase = Phase {
                id: tables.next_id(PHASE_PREFIX),
                project_id: project_id.to_string(),
                idx: p as i32 + 1,
                title: draft.title.clone(),
                description: draft.description.clone(),
                created_at: now,
                updated_at: now,
            };

            let mut ids = Vec::with_capacity(draft.tasks.len());
            for (t, task) in draft.tasks.iter().enumerate() {
                let mut depends_on = Vec::with_capacity(task.depends_on.len());
                for dep in &task.depends_on {
                    let resolved = if dep.phase == p {
                        ids.get(dep.task)
                    } else {
                        task_ids.get(dep.phase).and_then(|phase_ids| phase_ids.get(dep.task))
                    };
                    let Some(resolved) = resolved else {
                        return Err(StoreError::Integrity(format!(
                            "Outline task ({p}, {t}) depends on unknown task ({}, {})",
                            dep.phase, dep.task
                        )));
                    };
                    depends_on.push(resolved.clone());
                }
                let id = tables.next_id(TASK_PREFIX);
                tables.tasks.push(Task {
                    id: id.clone(),
                    project_id: project_id.to_string(),
                    phase_id: phase.id.clone(),
                    idx: t as i32 + 1,
                    title: task.title.clone(),
                    description: task.description.clone(),
                    duration_days: task.duration_days,
                    depends_on,
                    created_at: now,
                    updated_at: now,
                });
                ids.push(id);
            }
            tables.phases.push(phase);
            task_ids.push(ids);
        }

        Ok(collect_plan(&tables, project_id))
    }
}
