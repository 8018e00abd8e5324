//! Account entity model and DTOs.

use blueprint_core::types::{EntityId, Timestamp};
use serde::Serialize;

/// A registered account. The password hash never leaves the store.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: EntityId,
    pub first_name: String,
    pub last_name: String,
    pub name: String,
    pub email: String,
    pub company: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone)]
pub struct CreateUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub company: Option<String>,
    pub password_hash: String,
}
