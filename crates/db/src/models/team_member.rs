//! Team member entity model and DTOs.

use blueprint_core::roles::MemberRole;
use blueprint_core::types::{EntityId, Timestamp};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamMember {
    pub id: EntityId,
    pub project_id: EntityId,
    pub user_id: EntityId,
    pub full_name: String,
    pub email: String,
    pub role: MemberRole,
    pub added_at: Timestamp,
}

#[derive(Debug, Clone)]
pub struct CreateTeamMember {
    pub project_id: EntityId,
    pub user_id: EntityId,
    pub full_name: String,
    pub email: String,
    pub role: MemberRole,
}
