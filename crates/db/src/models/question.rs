//! Wizard question entity model and DTOs.

use blueprint_core::types::{EntityId, Timestamp};
use serde::{Deserialize, Serialize};

/// Lifecycle of a question. `Answered` and `Skipped` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionStatus {
    Pending,
    Answered,
    Skipped,
}

impl QuestionStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: EntityId,
    pub project_id: EntityId,
    pub topic: String,
    pub question_text: String,
    pub answer_text: Option<String>,
    pub status: QuestionStatus,
    pub asked_at: Timestamp,
    pub answered_at: Option<Timestamp>,
}

/// DTO for storing a freshly generated question.
#[derive(Debug, Clone)]
pub struct CreateQuestion {
    pub project_id: EntityId,
    pub topic: String,
    pub question_text: String,
}

/// How a pending question is closed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Answer(String),
    Skip,
}
