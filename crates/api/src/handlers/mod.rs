//! Request handlers, one submodule per resource.
//!
//! Handlers validate input, delegate to the repositories in `blueprint_db`
//! and map errors via [`AppError`](crate::error::AppError). Long-running
//! work is handed to [`crate::engine`] through the job registry.

pub mod account;
pub mod chat;
pub mod extraction;
pub mod plan;
pub mod progress;
pub mod project;
pub mod question;
pub mod team;
pub mod upload;
pub mod workflow;

use blueprint_core::error::CoreError;
use blueprint_db::models::project::Project;
use serde::Serialize;

use crate::error::AppResult;
use crate::state::AppState;

/// Load a project or fail with 404.
pub(crate) async fn find_project(state: &AppState, id: &str) -> AppResult<Project> {
    let project = state
        .repos
        .projects
        .find_by_id(id)
        .await?
        .ok_or_else(|| CoreError::not_found("Project", id))?;
    Ok(project)
}

/// `{ "success": true }`, returned by deletes.
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

/// Acknowledgement for requests that start background work.
#[derive(Debug, Serialize)]
pub struct StartedResponse {
    pub message: &'static str,
    #[serde(rename = "projectId")]
    pub project_id: String,
}
