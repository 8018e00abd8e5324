//! Repository for project team members.
//!
//! The owner rules from [`blueprint_core::roles`] are applied here, so no
//! caller can demote, promote to, or remove an owner.

use async_trait::async_trait;
use blueprint_core::roles::{validate_invite_role, validate_removal, validate_role_change, MemberRole};
use chrono::Utc;

use crate::error::StoreError;
use crate::memory::{MemoryStore, MEMBER_PREFIX};
use crate::models::team_member::{CreateTeamMember, TeamMember};

#[async_trait]
pub trait TeamRepo: Send + Sync {
    /// Members of a project, owner first, then in the order they joined.
    async fn list_by_project(&self, project_id: &str) -> Result<Vec<TeamMember>, StoreError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<TeamMember>, StoreError>;

    /// Add an invited member.
    ///
    /// Fails with [`StoreError::Conflict`] when the email is already on the
    /// team, and with a `Forbidden` rejection for the owner role.
    async fn create(&self, input: &CreateTeamMember) -> Result<TeamMember, StoreError>;

    async fn update_role(&self, id: &str, role: MemberRole) -> Result<Option<TeamMember>, StoreError>;

    /// Remove a member. Returns the removed row, or `None` if it did not exist.
    async fn delete(&self, id: &str) -> Result<Option<TeamMember>, StoreError>;
}

#[async_trait]
impl TeamRepo for MemoryStore {
    async fn list_by_project(&self, project_id: &str) -> Result<Vec<TeamMember>, StoreError> {
        let tables = self.tables.read().await;
        let mut members: Vec<TeamMember> = tables
            .members
            .iter()
            .filter(|m| m.project_id == project_id)
            .cloned()
            .collect();
        // Stable sort keeps join order among non-owners.
        members.sort_by_key(|m| m.role != MemberRole::Owner);
        Ok(members)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<TeamMember>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.members.iter().find(|m| m.id == id).cloned())
    }

    async fn create(&self, input: &CreateTeamMember) -> Result<TeamMember, StoreError> {
        validate_invite_role(input.role)?;
        let mut tables = self.tables.write().await;
        if !tables.project_exists(&input.project_id) {
            return Err(StoreError::Integrity(format!(
                "Cannot add a member to missing project {}",
                input.project_id
            )));
        }
        if tables
            .members
            .iter()
            .any(|m| m.project_id == input.project_id && m.email.eq_ignore_ascii_case(&input.email))
        {
            return Err(StoreError::Conflict(format!(
                "{} is already a member of this project",
                input.email
            )));
        }
        let member = TeamMember {
            id: tables.next_id(MEMBER_PREFIX),
            project_id: input.project_id.clone(),
            user_id: input.user_id.clone(),
            full_name: input.full_name.clone(),
            email: input.email.clone(),
            role: input.role,
            added_at: Utc::now(),
        };
        tables.members.push(member.clone());
        Ok(member)
    }

    async fn update_role(&self, id: &str, role: MemberRole) -> Result<Option<TeamMember>, StoreError> {
        let mut tables = self.tables.write().await;
        let Some(member) = tables.members.iter_mut().find(|m| m.id == id) else {
            return Ok(None);
        };
        validate_role_change(member.role, role)?;
        member.role = role;
        Ok(Some(member.clone()))
    }

    async fn delete(&self, id: &str) -> Result<Option<TeamMember>, StoreError> {
        let mut tables = self.tables.write().await;
        let Some(pos) = tables.members.iter().position(|m| m.id == id) else {
            return Ok(None);
        };
        validate_removal(tables.members[pos].role)?;
        Ok(Some(tables.members.remove(pos)))
    }
}
