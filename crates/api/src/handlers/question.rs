//! Handlers for the question/answer wizard under `/ai/questions`.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use blueprint_core::error::CoreError;
use blueprint_core::questions::QuestionContext;
use blueprint_core::types::EntityId;
use blueprint_core::validation::require_text;
use blueprint_core::workflow::{transition, WorkflowEvent, WorkflowState};
use blueprint_db::models::question::{CreateQuestion, Question, Resolution};
use blueprint_db::StoreError;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::handlers::find_project;
use crate::query::ProjectIdParams;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    pub answer: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerResponse {
    pub message: &'static str,
    pub question_id: EntityId,
    pub answer: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkipResponse {
    pub message: &'static str,
    pub question_id: EntityId,
}

/// GET /api/ai/questions?projectId=
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ProjectIdParams>,
) -> AppResult<Json<Vec<Question>>> {
    let project_id = params.require()?;
    let questions = state.repos.questions.list_by_project(&project_id).await?;
    if questions.is_empty() {
        return Err(CoreError::NotFound {
            entity: "Questions for project",
            id: project_id,
        }
        .into());
    }
    Ok(Json(questions))
}

/// POST /api/ai/questions/next
///
/// Returns the pending question, or generates one. Responds 204 once no
/// further questions are needed, moving the project on to `planning`.
pub async fn next(
    State(state): State<AppState>,
    Json(params): Json<ProjectIdParams>,
) -> AppResult<Response> {
    let project_id = params.require()?;
    let project = find_project(&state, &project_id).await?;

    match project.status {
        WorkflowState::Questioning => {}
        WorkflowState::Planning | WorkflowState::Completed => {
            return Ok(StatusCode::NO_CONTENT.into_response())
        }
        other => {
            return Err(CoreError::Conflict(format!(
                "Questions are not available while project is {other}"
            ))
            .into())
        }
    }

    if let Some(pending) = state.repos.questions.find_pending(&project_id).await? {
        return Ok(Json(pending).into_response());
    }

    tokio::time::sleep(state.config.simulation.question_delay).await;

    let selected_labels: Vec<String> = state
        .repos
        .extractions
        .list_by_project(&project_id)
        .await?
        .into_iter()
        .filter(|i| i.selected)
        .map(|i| i.label)
        .collect();
    let asked_topics: Vec<String> = state
        .repos
        .questions
        .list_by_project(&project_id)
        .await?
        .into_iter()
        .map(|q| q.topic)
        .collect();

    let draft = state.questions.next_question(&QuestionContext {
        selected_labels: &selected_labels,
        asked_topics: &asked_topics,
    });

    let Some(draft) = draft else {
        finish_questions(&state, &project_id).await?;
        return Ok(StatusCode::NO_CONTENT.into_response());
    };

    let created = state
        .repos
        .questions
        .create(&CreateQuestion {
            project_id: project_id.clone(),
            topic: draft.topic,
            question_text: draft.text,
        })
        .await;

    let question = match created {
        Ok(question) => {
            tracing::debug!(project_id = %project_id, question_id = %question.id, topic = %question.topic, "Question asked");
            question
        }
        // A concurrent request asked first; hand out its question.
        Err(StoreError::Conflict(_)) => state
            .repos
            .questions
            .find_pending(&project_id)
            .await?
            .ok_or_else(|| AppError::InternalError("Pending question vanished".into()))?,
        Err(e) => return Err(e.into()),
    };
    Ok(Json(question).into_response())
}

async fn finish_questions(state: &AppState, project_id: &str) -> AppResult<()> {
    let next = transition(WorkflowState::Questioning, WorkflowEvent::QuestionsExhausted)?;
    match state
        .repos
        .projects
        .update_status(project_id, WorkflowState::Questioning, next)
        .await
    {
        Ok(_) => {
            tracing::info!(project_id, "Questions exhausted, project ready for planning");
            Ok(())
        }
        // Already moved on by a concurrent request.
        Err(StoreError::Conflict(_)) => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// POST /api/ai/questions/{id}/answer
pub async fn answer(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
    Json(input): Json<AnswerRequest>,
) -> AppResult<Json<AnswerResponse>> {
    let answer = require_text("Answer", input.answer.as_deref())?.to_string();
    let question = state
        .repos
        .questions
        .resolve(&id, Resolution::Answer(answer.clone()))
        .await?
        .ok_or_else(|| CoreError::not_found("Question", &id))?;

    tracing::debug!(question_id = %question.id, project_id = %question.project_id, "Question answered");
    Ok(Json(AnswerResponse {
        message: "Answer submitted successfully",
        question_id: question.id,
        answer,
    }))
}

/// POST /api/ai/questions/{id}/skip
pub async fn skip(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> AppResult<Json<SkipResponse>> {
    let question = state
        .repos
        .questions
        .resolve(&id, Resolution::Skip)
        .await?
        .ok_or_else(|| CoreError::not_found("Question", &id))?;

    tracing::debug!(question_id = %question.id, project_id = %question.project_id, "Question skipped");
    Ok(Json(SkipResponse {
        message: "Question skipped successfully",
        question_id: question.id,
    }))
}
