//! Handlers for plan generation and for editing phases and tasks.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use blueprint_core::error::CoreError;
use blueprint_core::types::EntityId;
use blueprint_core::validation::require_text;
use blueprint_core::workflow::WorkflowState;
use blueprint_db::models::plan::{
    CreatePhase, CreateTask, Phase, PhaseWithTasks, Task, UpdatePhase, UpdateTask,
};
use serde::Deserialize;

use crate::engine;
use crate::error::AppResult;
use crate::handlers::{find_project, StartedResponse, SuccessResponse};
use crate::jobs::JobKind;
use crate::query::ProjectIdParams;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreatePhaseRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub idx: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub duration_days: Option<u32>,
    #[serde(default)]
    pub depends_on: Vec<EntityId>,
    pub idx: Option<i32>,
}

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

/// POST /api/ai/plan/outline
///
/// Starts plan generation for a project in `planning`. Progress is reported
/// on the progress stream; the project becomes `completed` when done.
pub async fn generate_outline(
    State(state): State<AppState>,
    Json(params): Json<ProjectIdParams>,
) -> AppResult<Json<StartedResponse>> {
    let project_id = params.require()?;
    let project = find_project(&state, &project_id).await?;
    if project.status != WorkflowState::Planning {
        return Err(CoreError::Conflict(format!(
            "Plan generation requires a project in planning; project is {}",
            project.status
        ))
        .into());
    }

    let job = engine::planning::run(state.clone(), project_id.clone());
    if !state.jobs.spawn(JobKind::PlanGeneration, &project_id, job).await {
        return Err(CoreError::Conflict("Plan generation is already running".into()).into());
    }

    tracing::info!(project_id = %project_id, "Plan generation started");
    Ok(Json(StartedResponse {
        message: "Plan generation started successfully",
        project_id,
    }))
}

// ---------------------------------------------------------------------------
// Phases
// ---------------------------------------------------------------------------

/// GET /api/projects/{id}/phases
pub async fn list_phases(
    State(state): State<AppState>,
    Path(project_id): Path<EntityId>,
) -> AppResult<Json<Vec<PhaseWithTasks>>> {
    find_project(&state, &project_id).await?;
    let plan = state.repos.plans.list_by_project(&project_id).await?;
    Ok(Json(plan))
}

/// POST /api/projects/{id}/phases
pub async fn create_phase(
    State(state): State<AppState>,
    Path(project_id): Path<EntityId>,
    Json(input): Json<CreatePhaseRequest>,
) -> AppResult<(StatusCode, Json<Phase>)> {
    let title = require_text("Phase title", input.title.as_deref())?;
    find_project(&state, &project_id).await?;

    let phase = state
        .repos
        .plans
        .create_phase(
            &project_id,
            &CreatePhase {
                title: title.to_string(),
                description: input.description,
                idx: input.idx,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(phase)))
}

/// PUT /api/projects/{id}/phases/{phase_id}
pub async fn update_phase(
    State(state): State<AppState>,
    Path((project_id, phase_id)): Path<(EntityId, EntityId)>,
    Json(input): Json<UpdatePhase>,
) -> AppResult<Json<Phase>> {
    if let Some(title) = input.title.as_deref() {
        require_text("Phase title", Some(title))?;
    }
    scoped_phase(&state, &project_id, &phase_id).await?;

    let phase = state
        .repos
        .plans
        .update_phase(&phase_id, &input)
        .await?
        .ok_or_else(|| CoreError::not_found("Phase", &phase_id))?;
    Ok(Json(phase))
}

/// DELETE /api/projects/{id}/phases/{phase_id}
pub async fn delete_phase(
    State(state): State<AppState>,
    Path((project_id, phase_id)): Path<(EntityId, EntityId)>,
) -> AppResult<Json<SuccessResponse>> {
    scoped_phase(&state, &project_id, &phase_id).await?;
    if !state.repos.plans.delete_phase(&phase_id).await? {
        return Err(CoreError::not_found("Phase", &phase_id).into());
    }
    Ok(Json(SuccessResponse::ok()))
}

async fn scoped_phase(state: &AppState, project_id: &str, phase_id: &str) -> AppResult<Phase> {
    match state.repos.plans.find_phase(phase_id).await? {
        Some(phase) if phase.project_id == project_id => Ok(phase),
        _ => Err(CoreError::not_found("Phase", phase_id).into()),
    }
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

/// POST /api/projects/{id}/phases/{phase_id}/tasks
pub async fn create_task(
    State(state): State<AppState>,
    Path((project_id, phase_id)): Path<(EntityId, EntityId)>,
    Json(input): Json<CreateTaskRequest>,
) -> AppResult<(StatusCode, Json<Task>)> {
    let title = require_text("Task title", input.title.as_deref())?;
    scoped_phase(&state, &project_id, &phase_id).await?;

    let task = state
        .repos
        .plans
        .create_task(
            &phase_id,
            &CreateTask {
                title: title.to_string(),
                description: input.description,
                duration_days: input.duration_days,
                depends_on: input.depends_on,
                idx: input.idx,
            },
        )
        .await?
        .ok_or_else(|| CoreError::not_found("Phase", &phase_id))?;
    Ok((StatusCode::CREATED, Json(task)))
}

/// PUT /api/projects/{id}/tasks/{task_id}
pub async fn update_task(
    State(state): State<AppState>,
    Path((project_id, task_id)): Path<(EntityId, EntityId)>,
    Json(input): Json<UpdateTask>,
) -> AppResult<Json<Task>> {
    if let Some(title) = input.title.as_deref() {
        require_text("Task title", Some(title))?;
    }
    scoped_task(&state, &project_id, &task_id).await?;

    let task = state
        .repos
        .plans
        .update_task(&task_id, &input)
        .await?
        .ok_or_else(|| CoreError::not_found("Task", &task_id))?;
    Ok(Json(task))
}

/// DELETE /api/projects/{id}/tasks/{task_id}
pub async fn delete_task(
    State(state): State<AppState>,
    Path((project_id, task_id)): Path<(EntityId, EntityId)>,
) -> AppResult<Json<SuccessResponse>> {
    scoped_task(&state, &project_id, &task_id).await?;
    if !state.repos.plans.delete_task(&task_id).await? {
        return Err(CoreError::not_found("Task", &task_id).into());
    }
    Ok(Json(SuccessResponse::ok()))
}

async fn scoped_task(state: &AppState, project_id: &str, task_id: &str) -> AppResult<Task> {
    match state.repos.plans.find_task(task_id).await? {
        Some(task) if task.project_id == project_id => Ok(task),
        _ => Err(CoreError::not_found("Task", task_id).into()),
    }
}
