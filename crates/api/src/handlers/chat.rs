//! Chat fixture handlers. Contacts and histories are static demo data.

use axum::Json;
use blueprint_db::fixtures;
use blueprint_db::models::chat::{ChatContact, ChatMessage};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct ChatUsersResponse {
    pub users: Vec<ChatContact>,
    pub success: bool,
}

#[derive(Debug, Deserialize)]
pub struct ChatFilterRequest {
    #[serde(default)]
    pub user: String,
}

/// GET /api/chat/users
pub async fn users() -> Json<ChatUsersResponse> {
    Json(ChatUsersResponse {
        users: fixtures::chat_contacts(),
        success: true,
    })
}

/// POST /api/chat/filter
///
/// Message history with the named contact; empty for unknown names.
pub async fn filter(Json(input): Json<ChatFilterRequest>) -> Json<Vec<ChatMessage>> {
    Json(fixtures::chat_history(input.user.trim()))
}
