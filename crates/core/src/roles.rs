//! Project team roles and the rules around the owner.
//!
//! A project has exactly one `owner`, assigned when the project is created.
//! The owner's role cannot be changed, the owner cannot be removed, and no
//! other member can be invited as or promoted to owner.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberRole {
    Owner,
    Admin,
    Editor,
    Viewer,
}

impl MemberRole {
    /// Parse a role name, case-insensitively.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "owner" => Ok(Self::Owner),
            "admin" => Ok(Self::Admin),
            "editor" => Ok(Self::Editor),
            "viewer" => Ok(Self::Viewer),
            other => Err(CoreError::Validation(format!(
                "Unknown role '{other}'; expected admin, editor or viewer"
            ))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Admin => "admin",
            Self::Editor => "editor",
            Self::Viewer => "viewer",
        }
    }

    /// Human-readable label, e.g. for member tables.
    pub fn label(self) -> &'static str {
        match self {
            Self::Owner => "Owner",
            Self::Admin => "Admin",
            Self::Editor => "Editor",
            Self::Viewer => "Viewer",
        }
    }
}

/// Check that a new member may be invited with `role`.
pub fn validate_invite_role(role: MemberRole) -> Result<(), CoreError> {
    match role {
        MemberRole::Owner => Err(CoreError::Forbidden(
            "A project has exactly one owner; invite as admin, editor or viewer".into(),
        )),
        MemberRole::Admin | MemberRole::Editor | MemberRole::Viewer => Ok(()),
    }
}

/// Check that a member currently holding `current` may be given `next`.
pub fn validate_role_change(current: MemberRole, next: MemberRole) -> Result<(), CoreError> {
    if current == MemberRole::Owner {
        return Err(CoreError::Forbidden("The owner's role cannot be changed".into()));
    }
    if next == MemberRole::Owner {
        return Err(CoreError::Forbidden(
            "Ownership cannot be assigned through a role change".into(),
        ));
    }
    Ok(())
}

/// Check that a member holding `role` may be removed from the project.
pub fn validate_removal(role: MemberRole) -> Result<(), CoreError> {
    match role {
        MemberRole::Owner => Err(CoreError::Forbidden(
            "The project owner cannot be removed".into(),
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn owner_cannot_be_invited() {
        assert_matches!(
            validate_invite_role(MemberRole::Owner),
            Err(CoreError::Forbidden(_))
        );
        assert!(validate_invite_role(MemberRole::Viewer).is_ok());
    }

    #[test]
    fn owner_role_is_immutable() {
        assert_matches!(
            validate_role_change(MemberRole::Owner, MemberRole::Admin),
            Err(CoreError::Forbidden(_))
        );
        assert_matches!(
            validate_role_change(MemberRole::Editor, MemberRole::Owner),
            Err(CoreError::Forbidden(_))
        );
        assert!(validate_role_change(MemberRole::Editor, MemberRole::Admin).is_ok());
    }

    #[test]
    fn owner_cannot_be_removed() {
        assert_matches!(
            validate_removal(MemberRole::Owner),
            Err(CoreError::Forbidden(_))
        );
        assert!(validate_removal(MemberRole::Admin).is_ok());
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(MemberRole::parse(" Admin ").unwrap(), MemberRole::Admin);
        assert_matches!(MemberRole::parse("superuser"), Err(CoreError::Validation(_)));
    }

    #[test]
    fn roles_deserialize_from_lowercase() {
        let role: MemberRole = serde_json::from_str("\"editor\"").unwrap();
        assert_eq!(role, MemberRole::Editor);
        assert!(serde_json::from_str::<MemberRole>("\"superuser\"").is_err());
    }
}
