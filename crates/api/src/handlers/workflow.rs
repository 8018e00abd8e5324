//! Handlers for the project workflow: state lookup, confirm and restart.

use axum::extract::{Path, State};
use axum::Json;
use blueprint_core::error::CoreError;
use blueprint_core::progress::{ProgressEvent, ProgressStage};
use blueprint_core::types::EntityId;
use blueprint_core::workflow::{transition, WorkflowEvent, WorkflowState};
use blueprint_db::models::project::Project;
use serde::Serialize;

use crate::engine::publish_progress;
use crate::error::AppResult;
use crate::handlers::find_project;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct WorkflowResponse {
    pub project_id: EntityId,
    pub state: WorkflowState,
    pub percent: f64,
    pub terminal: bool,
}

impl From<&Project> for WorkflowResponse {
    fn from(project: &Project) -> Self {
        Self {
            project_id: project.id.clone(),
            state: project.status,
            percent: project.status.percent(),
            terminal: project.status.is_terminal(),
        }
    }
}

/// GET /api/projects/{id}/workflow
pub async fn get_state(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> AppResult<Json<WorkflowResponse>> {
    let project = find_project(&state, &id).await?;
    Ok(Json(WorkflowResponse::from(&project)))
}

/// POST /api/projects/{id}/workflow/confirm
///
/// Confirms the review screen. At least one extracted item must be selected.
pub async fn confirm(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> AppResult<Json<WorkflowResponse>> {
    let project = find_project(&state, &id).await?;
    let selected = count_selected(&state, &id).await?;
    let next = transition(project.status, WorkflowEvent::ConfirmSelection { selected })?;

    let project = state
        .repos
        .projects
        .update_status(&id, project.status, next)
        .await?
        .ok_or_else(|| CoreError::not_found("Project", &id))?;

    publish_progress(
        &state,
        &id,
        ProgressEvent::new(
            ProgressStage::Questioning,
            format!("{selected} items confirmed, preparing questions"),
        ),
    )
    .await;
    tracing::info!(project_id = %id, selected, "Review confirmed");
    Ok(Json(WorkflowResponse::from(&project)))
}

/// POST /api/projects/{id}/workflow/restart
pub async fn restart(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> AppResult<Json<WorkflowResponse>> {
    let project = restart_project(&state, &id).await?;
    Ok(Json(WorkflowResponse::from(&project)))
}

/// Cancel the project's jobs, reset it to `draft` and forget its progress.
pub(crate) async fn restart_project(state: &AppState, id: &str) -> AppResult<Project> {
    state.jobs.cancel_project(id).await;
    let project = state
        .repos
        .projects
        .restart(id)
        .await?
        .ok_or_else(|| CoreError::not_found("Project", id))?;
    state.progress.reset(id).await;

    tracing::info!(project_id = %id, "Analysis restarted");
    Ok(project)
}

pub(crate) async fn count_selected(state: &AppState, project_id: &str) -> AppResult<usize> {
    let items = state.repos.extractions.list_by_project(project_id).await?;
    Ok(items.iter().filter(|i| i.selected).count())
}
