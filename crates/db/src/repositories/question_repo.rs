//! Repository for wizard questions.

use async_trait::async_trait;
use chrono::Utc;

use crate::error::StoreError;
use crate::memory::{MemoryStore, QUESTION_PREFIX};
use crate::models::question::{CreateQuestion, Question, QuestionStatus, Resolution};

#[async_trait]
pub trait QuestionRepo: Send + Sync {
    /// Store a new pending question.
    ///
    /// Fails with [`StoreError::Conflict`] if the project already has a
    /// pending question, so at most one is ever open.
    async fn create(&self, input: &CreateQuestion) -> Result<Question, StoreError>;

    /// All questions of a project in the order they were asked.
    async fn list_by_project(&self, project_id: &str) -> Result<Vec<Question>, StoreError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Question>, StoreError>;

    async fn find_pending(&self, project_id: &str) -> Result<Option<Question>, StoreError>;

    /// Answer or skip a pending question.
    ///
    /// Fails with [`StoreError::Conflict`] if the question is already
    /// answered or skipped. Returns `None` if it does not exist.
    async fn resolve(&self, id: &str, resolution: Resolution) -> Result<Option<Question>, StoreError>;
}

#[async_trait]
impl QuestionRepo for MemoryStore {
    async fn create(&self, input: &CreateQuestion) -> Result<Question, StoreError> {
        let mut tables = self.tables.write().await;
        if !tables.project_exists(&input.project_id) {
            return Err(StoreError::Integrity(format!(
                "Cannot store a question for missing project {}",
                input.project_id
            )));
        }
        if tables
            .questions
            .iter()
            .any(|q| q.project_id == input.project_id && q.status == QuestionStatus::Pending)
        {
            return Err(StoreError::Conflict(format!(
                "Project {} already has a pending question",
                input.project_id
            )));
        }
        let question = Question {
            id: tables.next_id(QUESTION_PREFIX),
            project_id: input.project_id.clone(),
            topic: input.topic.clone(),
            question_text: input.question_text.clone(),
            answer_text: None,
            status: QuestionStatus::Pending,
            asked_at: Utc::now(),
            answered_at: None,
        };
        tables.questions.push(question.clone());
        Ok(question)
    }

    async fn list_by_project(&self, project_id: &str) -> Result<Vec<Question>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .questions
            .iter()
            .filter(|q| q.project_id == project_id)
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Question>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.questions.iter().find(|q| q.id == id).cloned())
    }

    async fn find_pending(&self, project_id: &str) -> Result<Option<Question>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .questions
            .iter()
            .find(|q| q.project_id == project_id && q.status == QuestionStatus::Pending)
            .cloned())
    }

    async fn resolve(&self, id: &str, resolution: Resolution) -> Result<Option<Question>, StoreError> {
        let mut tables = self.tables.write().await;
        let Some(question) = tables.questions.iter_mut().find(|q| q.id == id) else {
            return Ok(None);
        };
        if question.status.is_terminal() {
            return Err(StoreError::Conflict(format!(
                "Question {id} has already been {}",
                match question.status {
                    QuestionStatus::Skipped => "skipped",
                    _ => "answered",
                }
            )));
        }
        match resolution {
            Resolution::Answer(text) => {
                question.answer_text = Some(text);
                question.status = QuestionStatus::Answered;
            }
            Resolution::Skip => question.status = QuestionStatus::Skipped,
        }
        question.answered_at = Some(Utc::now());
        Ok(Some(question.clone()))
    }
}
