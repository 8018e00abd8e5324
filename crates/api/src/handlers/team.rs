//! Handlers for project team membership under `/team`.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use blueprint_core::error::CoreError;
use blueprint_core::roles::MemberRole;
use blueprint_core::types::EntityId;
use blueprint_core::validation::{require_text, validate_email};
use blueprint_db::models::team_member::{CreateTeamMember, TeamMember};
use serde::Deserialize;

use crate::error::AppResult;
use crate::handlers::{find_project, SuccessResponse};
use crate::query::{require_project_id, ProjectIdParams};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct InviteRequest {
    #[serde(rename = "projectId")]
    pub project_id: Option<EntityId>,
    pub email: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: Option<String>,
}

/// GET /api/team?projectId=
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ProjectIdParams>,
) -> AppResult<Json<Vec<TeamMember>>> {
    let project_id = params.require()?;
    find_project(&state, &project_id).await?;
    let members = state.repos.team.list_by_project(&project_id).await?;
    Ok(Json(members))
}

/// POST /api/team/invite
///
/// Adds a member by email. A registered account with that email is linked;
/// otherwise the member stays an open invitation. The role defaults to
/// viewer.
pub async fn invite(
    State(state): State<AppState>,
    Json(input): Json<InviteRequest>,
) -> AppResult<(StatusCode, Json<TeamMember>)> {
    let project_id = require_project_id(input.project_id)?;
    let email = require_text("Email", input.email.as_deref())?.to_string();
    validate_email(&email)?;
    let role = match input.role.as_deref() {
        Some(role) => MemberRole::parse(role)?,
        None => MemberRole::Viewer,
    };
    find_project(&state, &project_id).await?;

    let (user_id, full_name) = match state.repos.users.find_by_email(&email).await? {
        Some(user) => (user.id, user.name),
        None => (format!("invited:{email}"), display_name(&email)),
    };

    let member = state
        .repos
        .team
        .create(&CreateTeamMember {
            project_id,
            user_id,
            full_name,
            email,
            role,
        })
        .await?;

    tracing::info!(member_id = %member.id, project_id = %member.project_id, role = member.role.as_str(), "Team member invited");
    Ok((StatusCode::CREATED, Json(member)))
}

/// Name shown for an invitee without an account: the email's local part.
fn display_name(email: &str) -> String {
    email.split('@').next().unwrap_or(email).to_string()
}

/// PUT /api/team/{member_id}/role
pub async fn update_role(
    State(state): State<AppState>,
    Path(member_id): Path<EntityId>,
    Json(input): Json<UpdateRoleRequest>,
) -> AppResult<Json<TeamMember>> {
    let role = MemberRole::parse(require_text("Role", input.role.as_deref())?)?;
    let member = state
        .repos
        .team
        .update_role(&member_id, role)
        .await?
        .ok_or_else(|| CoreError::not_found("Team member", &member_id))?;

    tracing::info!(member_id = %member.id, role = member.role.as_str(), "Team member role changed");
    Ok(Json(member))
}

/// DELETE /api/team/{member_id}
pub async fn remove(
    State(state): State<AppState>,
    Path(member_id): Path<EntityId>,
) -> AppResult<Json<SuccessResponse>> {
    let member = state
        .repos
        .team
        .delete(&member_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Team member", &member_id))?;

    tracing::info!(member_id = %member.id, project_id = %member.project_id, "Team member removed");
    Ok(Json(SuccessResponse::ok()))
}
