//! Handlers for `/ai/extract`: starting extraction, reading results and
//! adjusting the review selection.

use axum::extract::{Path, Query, State};
use axum::Json;
use blueprint_core::error::CoreError;
use blueprint_core::types::EntityId;
use blueprint_core::workflow::{transition, WorkflowEvent, WorkflowState};
use blueprint_db::models::extracted_item::ExtractedItem;
use serde::Deserialize;

use crate::engine;
use crate::error::AppResult;
use crate::handlers::{find_project, StartedResponse};
use crate::jobs::JobKind;
use crate::query::{require_project_id, ProjectIdParams};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ToggleRequest {
    pub selected: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct SelectAllRequest {
    #[serde(rename = "projectId")]
    pub project_id: Option<EntityId>,
    pub selected: Option<bool>,
}

/// GET /api/ai/extract?projectId=
///
/// 404 until extraction has produced items, which tells the client to start
/// one.
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ProjectIdParams>,
) -> AppResult<Json<Vec<ExtractedItem>>> {
    let project_id = params.require()?;
    let items = state.repos.extractions.list_by_project(&project_id).await?;
    if items.is_empty() {
        return Err(CoreError::NotFound {
            entity: "Extraction results for project",
            id: project_id,
        }
        .into());
    }
    Ok(Json(items))
}

/// POST /api/ai/extract
///
/// Moves a `draft` project to `extracting` and starts the job. A project
/// already `extracting` is acknowledged, restarting the job only if none is
/// running.
pub async fn start(
    State(state): State<AppState>,
    Json(params): Json<ProjectIdParams>,
) -> AppResult<Json<StartedResponse>> {
    let project_id = params.require()?;
    let project = find_project(&state, &project_id).await?;

    match project.status {
        WorkflowState::Draft => {
            let next = transition(project.status, WorkflowEvent::StartExtraction)?;
            state
                .repos
                .projects
                .update_status(&project_id, WorkflowState::Draft, next)
                .await?;
            spawn_extraction(&state, &project_id).await;
        }
        WorkflowState::Extracting => {
            if !state.jobs.is_running(JobKind::Extraction, &project_id).await {
                spawn_extraction(&state, &project_id).await;
            }
        }
        other => {
            return Err(CoreError::Conflict(format!(
                "Extraction already finished; project is {other}"
            ))
            .into())
        }
    }

    Ok(Json(StartedResponse {
        message: "Extraction started successfully",
        project_id,
    }))
}

async fn spawn_extraction(state: &AppState, project_id: &str) {
    let job = engine::extraction::run(state.clone(), project_id.to_string());
    if state.jobs.spawn(JobKind::Extraction, project_id, job).await {
        tracing::info!(project_id, "Extraction started");
    }
}

/// PATCH /api/ai/extract/{item_id}
///
/// Sets `selected`, or toggles it when the body omits it.
pub async fn toggle(
    State(state): State<AppState>,
    Path(item_id): Path<EntityId>,
    Json(input): Json<ToggleRequest>,
) -> AppResult<Json<ExtractedItem>> {
    let item = state
        .repos
        .extractions
        .set_selected(&item_id, input.selected)
        .await?
        .ok_or_else(|| CoreError::not_found("Extracted item", &item_id))?;
    Ok(Json(item))
}

/// POST /api/ai/extract/select-all
pub async fn select_all(
    State(state): State<AppState>,
    Json(input): Json<SelectAllRequest>,
) -> AppResult<Json<Vec<ExtractedItem>>> {
    let project_id = require_project_id(input.project_id)?;
    find_project(&state, &project_id).await?;
    let items = state
        .repos
        .extractions
        .set_all_selected(&project_id, input.selected.unwrap_or(true))
        .await?;
    Ok(Json(items))
}
