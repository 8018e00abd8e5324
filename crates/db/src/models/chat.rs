//! Chat contact and message fixtures.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatContact {
    pub id: u32,
    pub name: String,
    pub avatar: String,
    pub status: String,
    pub last_message: String,
    pub last_message_time: String,
    pub unread_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub id: u32,
    pub from: String,
    pub to: String,
    pub text: String,
    pub time: String,
}
