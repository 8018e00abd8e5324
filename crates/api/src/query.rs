//! Shared query and body parameter types for API handlers.

use blueprint_core::types::EntityId;
use serde::Deserialize;

use crate::error::AppError;

/// `?projectId=` query parameter, also used as a `{ "projectId": ... }` body.
#[derive(Debug, Default, Deserialize)]
pub struct ProjectIdParams {
    #[serde(rename = "projectId")]
    pub project_id: Option<EntityId>,
}

impl ProjectIdParams {
    /// The project id, or a 400 when it is missing or blank.
    pub fn require(self) -> Result<EntityId, AppError> {
        require_project_id(self.project_id)
    }
}

/// Reject a missing or blank project id with 400.
pub fn require_project_id(project_id: Option<EntityId>) -> Result<EntityId, AppError> {
    match project_id {
        Some(id) if !id.trim().is_empty() => Ok(id.trim().to_string()),
        _ => Err(AppError::BadRequest("Project ID is required".into())),
    }
}
