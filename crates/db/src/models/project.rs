//! Project entity model and DTOs.

use blueprint_core::types::{EntityId, Timestamp};
use blueprint_core::workflow::WorkflowState;
use serde::{Deserialize, Serialize};

/// A stored project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: EntityId,
    pub name: String,
    pub idea_text: String,
    pub status: WorkflowState,
    pub user_id: EntityId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new project. New projects always start in `draft`.
#[derive(Debug, Clone)]
pub struct CreateProject {
    pub name: String,
    pub idea_text: String,
    pub owner: ProjectOwner,
}

/// The account that becomes the project's owner team member.
#[derive(Debug, Clone)]
pub struct ProjectOwner {
    pub user_id: EntityId,
    pub full_name: String,
    pub email: String,
}

/// DTO for updating an existing project. All fields are optional.
///
/// Status changes do not go through this DTO; they use the compare-and-set
/// [`crate::repositories::ProjectRepo::update_status`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProject {
    pub name: Option<String>,
    pub idea_text: Option<String>,
}
