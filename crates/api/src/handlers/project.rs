//! Handlers for the `/projects` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use blueprint_core::error::CoreError;
use blueprint_core::types::EntityId;
use blueprint_core::validation::{require_text, validate_project_name};
use blueprint_core::workflow::{transition, WorkflowEvent, WorkflowState};
use blueprint_db::models::project::{CreateProject, Project, ProjectOwner, UpdateProject};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::handlers::{find_project, SuccessResponse};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Owner recorded when nobody is signed in and no account exists.
const ANONYMOUS_OWNER_ID: &str = "user_anonymous";

#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    pub name: Option<String>,
    pub idea_text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProjectRequest {
    pub name: Option<String>,
    pub idea_text: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProjectListResponse {
    pub projects: Vec<Project>,
    pub success: bool,
}

/// POST /api/projects
///
/// The signed-in user owns the new project. Without a token the first
/// account in the store is used.
pub async fn create(
    State(state): State<AppState>,
    auth: Option<AuthUser>,
    Json(input): Json<CreateProjectRequest>,
) -> AppResult<(StatusCode, Json<Project>)> {
    let required = || AppError::BadRequest("Project name and idea text are required".into());
    let name = require_text("name", input.name.as_deref()).map_err(|_| required())?;
    let idea_text = require_text("idea_text", input.idea_text.as_deref()).map_err(|_| required())?;
    validate_project_name(name)?;

    let owner = resolve_owner(&state, auth).await?;
    let project = state
        .repos
        .projects
        .create(&CreateProject {
            name: name.to_string(),
            idea_text: idea_text.to_string(),
            owner,
        })
        .await?;

    tracing::info!(project_id = %project.id, user_id = %project.user_id, "Project created");
    Ok((StatusCode::CREATED, Json(project)))
}

async fn resolve_owner(state: &AppState, auth: Option<AuthUser>) -> AppResult<ProjectOwner> {
    let user = match auth {
        Some(auth) => state.repos.users.find_by_id(&auth.user_id).await?,
        None => state.repos.users.first().await?,
    };
    Ok(match user {
        Some(user) => ProjectOwner {
            user_id: user.id,
            full_name: user.name,
            email: user.email,
        },
        None => ProjectOwner {
            user_id: ANONYMOUS_OWNER_ID.into(),
            full_name: "Project Owner".into(),
            email: "owner@example.com".into(),
        },
    })
}

/// GET /api/projects
pub async fn list(State(state): State<AppState>) -> AppResult<Json<ProjectListResponse>> {
    let projects = state.repos.projects.list().await?;
    Ok(Json(ProjectListResponse {
        projects,
        success: true,
    }))
}

/// GET /api/projects/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> AppResult<Json<Project>> {
    Ok(Json(find_project(&state, &id).await?))
}

/// PUT /api/projects/{id}
///
/// `status` may only name a move the client is allowed to request directly:
/// back to `draft` (restart), `reviewing -> questioning` (confirm) and
/// `questioning -> planning`. Moves owned by background jobs are refused
/// with 409.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
    Json(input): Json<UpdateProjectRequest>,
) -> AppResult<Json<Project>> {
    let project = find_project(&state, &id).await?;

    if let Some(name) = input.name.as_deref() {
        validate_project_name(name)?;
    }
    if let Some(idea_text) = input.idea_text.as_deref() {
        require_text("idea_text", Some(idea_text))?;
    }

    if let Some(status) = input.status.as_deref() {
        let next = WorkflowState::parse(status)?;
        if next != project.status {
            apply_status_change(&state, &project, next).await?;
        }
    }

    let updated = state
        .repos
        .projects
        .update(
            &id,
            &UpdateProject {
                name: input.name.map(|n| n.trim().to_string()),
                idea_text: input.idea_text.map(|t| t.trim().to_string()),
            },
        )
        .await?
        .ok_or_else(|| CoreError::not_found("Project", &id))?;

    Ok(Json(updated))
}

async fn apply_status_change(
    state: &AppState,
    project: &Project,
    next: WorkflowState,
) -> AppResult<()> {
    if next == WorkflowState::Draft {
        crate::handlers::workflow::restart_project(state, &project.id).await?;
        return Ok(());
    }

    let event = match (project.status, next) {
        (WorkflowState::Reviewing, WorkflowState::Questioning) => {
            let selected = crate::handlers::workflow::count_selected(state, &project.id).await?;
            WorkflowEvent::ConfirmSelection { selected }
        }
        (WorkflowState::Questioning, WorkflowState::Planning) => WorkflowEvent::QuestionsExhausted,
        (from, to) => {
            return Err(CoreError::Conflict(format!(
                "Cannot change project status from {from} to {to} directly"
            ))
            .into())
        }
    };

    let target = transition(project.status, event)?;
    state
        .repos
        .projects
        .update_status(&project.id, project.status, target)
        .await?;
    tracing::info!(project_id = %project.id, from = %project.status, to = %target, "Project status changed");
    Ok(())
}

/// DELETE /api/projects/{id}
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> AppResult<Json<SuccessResponse>> {
    state.jobs.cancel_project(&id).await;
    let deleted = state.repos.projects.delete(&id).await?;
    if !deleted {
        return Err(CoreError::not_found("Project", &id).into());
    }
    state.progress.reset(&id).await;

    tracing::info!(project_id = %id, "Project deleted");
    Ok(Json(SuccessResponse::ok()))
}
