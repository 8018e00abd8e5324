//! Drives a project from creation to a finished plan through the API.
//!
//! The orchestrator keeps its own copy of the workflow state and advances it
//! with the shared [`transition`] function before each step, then checks the
//! server agrees. Review and question answering are pluggable through
//! [`ReviewPolicy`] and [`AnswerSource`].

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use blueprint_core::error::CoreError;
use blueprint_core::progress::ProgressTracker;
use blueprint_core::retry::RetryPolicy;
use blueprint_core::types::EntityId;
use blueprint_core::workflow::{transition, WorkflowEvent, WorkflowState};
use blueprint_db::models::extracted_item::ExtractedItem;
use blueprint_db::models::plan::PhaseWithTasks;
use blueprint_db::models::project::Project;
use blueprint_db::models::question::Question;
use tokio_util::sync::CancellationToken;

use crate::api::ApiClient;
use crate::error::{ClientError, ClientResult};
use crate::progress::{ProgressSubscription, ProgressUpdate};
use crate::retry::poll_until;

// ---------------------------------------------------------------------------
// Review
// ---------------------------------------------------------------------------

/// Decides which extracted items go forward before the selection is confirmed.
#[async_trait]
pub trait ReviewPolicy: Send + Sync {
    /// Apply the policy and return the items as they stand afterwards.
    async fn review(
        &self,
        api: &ApiClient,
        project_id: &str,
        items: Vec<ExtractedItem>,
    ) -> ClientResult<Vec<ExtractedItem>>;
}

/// Accept the selection the server proposed.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeepSelection;

#[async_trait]
impl ReviewPolicy for KeepSelection {
    async fn review(
        &self,
        _api: &ApiClient,
        _project_id: &str,
        items: Vec<ExtractedItem>,
    ) -> ClientResult<Vec<ExtractedItem>> {
        Ok(items)
    }
}

/// Select every extracted item.
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectAll;

#[async_trait]
impl ReviewPolicy for SelectAll {
    async fn review(
        &self,
        api: &ApiClient,
        project_id: &str,
        _items: Vec<ExtractedItem>,
    ) -> ClientResult<Vec<ExtractedItem>> {
        api.select_all(project_id, true).await
    }
}

/// Keep exactly the items whose confidence reaches the threshold.
#[derive(Debug, Clone, Copy)]
pub struct MinConfidence(pub f64);

#[async_trait]
impl ReviewPolicy for MinConfidence {
    async fn review(
        &self,
        api: &ApiClient,
        _project_id: &str,
        items: Vec<ExtractedItem>,
    ) -> ClientResult<Vec<ExtractedItem>> {
        let mut reviewed = Vec::with_capacity(items.len());
        for item in items {
            let wanted = item.confidence >= self.0;
            if item.selected == wanted {
                reviewed.push(item);
            } else {
                reviewed.push(api.set_item_selected(&item.id, Some(wanted)).await?);
            }
        }
        Ok(reviewed)
    }
}

// ---------------------------------------------------------------------------
// Answers
// ---------------------------------------------------------------------------

/// What to do with a follow-up question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Answer(String),
    Skip,
}

/// Supplies replies to the wizard's follow-up questions.
#[async_trait]
pub trait AnswerSource: Send + Sync {
    async fn reply(&self, question: &Question) -> Reply;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SkipAll;

#[async_trait]
impl AnswerSource for SkipAll {
    async fn reply(&self, _question: &Question) -> Reply {
        Reply::Skip
    }
}

/// Answers keyed by question topic; unknown topics are skipped.
#[derive(Debug, Clone, Default)]
pub struct CannedAnswers {
    by_topic: HashMap<String, String>,
}

impl CannedAnswers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, topic: impl Into<String>, answer: impl Into<String>) -> Self {
        self.by_topic.insert(topic.into(), answer.into());
        self
    }
}

#[async_trait]
impl AnswerSource for CannedAnswers {
    async fn reply(&self, question: &Question) -> Reply {
        match self.by_topic.get(&question.topic) {
            Some(answer) => Reply::Answer(answer.clone()),
            None => Reply::Skip,
        }
    }
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

/// Everything the run produced.
#[derive(Debug, Clone)]
pub struct WorkflowOutcome {
    pub project: Project,
    pub items: Vec<ExtractedItem>,
    pub questions: Vec<Question>,
    pub phases: Vec<PhaseWithTasks>,
    pub progress: Vec<ProgressUpdate>,
    pub tracker: ProgressTracker,
}

pub struct WorkflowOrchestrator {
    api: ApiClient,
    review: Box<dyn ReviewPolicy>,
    answers: Box<dyn AnswerSource>,
    polling: RetryPolicy,
    reconnect: Option<RetryPolicy>,
    cancel: CancellationToken,
    state: WorkflowState,
}

impl WorkflowOrchestrator {
    /// Orchestrator that keeps the server's selection, skips every question
    /// and polls for extraction results once a second, 30 times at most.
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            review: Box::new(KeepSelection),
            answers: Box::new(SkipAll),
            polling: RetryPolicy::polling(),
            reconnect: None,
            cancel: CancellationToken::new(),
            state: WorkflowState::Draft,
        }
    }

    pub fn with_review_policy(mut self, policy: impl ReviewPolicy + 'static) -> Self {
        self.review = Box::new(policy);
        self
    }

    pub fn with_answer_source(mut self, source: impl AnswerSource + 'static) -> Self {
        self.answers = Box::new(source);
        self
    }

    /// Policy for waiting on extraction results.
    pub fn with_polling(mut self, policy: RetryPolicy) -> Self {
        self.polling = policy;
        self
    }

    /// Policy for reopening a dropped progress stream.
    pub fn with_reconnect_policy(mut self, policy: RetryPolicy) -> Self {
        self.reconnect = Some(policy);
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// The orchestrator's view of the current workflow state.
    pub fn state(&self) -> WorkflowState {
        self.state
    }

    /// Create a project and drive it to completion.
    pub async fn run(&mut self, name: &str, idea_text: &str) -> ClientResult<WorkflowOutcome> {
        let project = self.api.create_project(name, idea_text).await?;
        tracing::info!(project_id = %project.id, "Project created");
        self.drive(&project.id).await
    }

    /// Drive an existing project from whatever state the server reports.
    pub async fn drive(&mut self, project_id: &str) -> ClientResult<WorkflowOutcome> {
        self.state = self.api.get_project(project_id).await?.status;
        tracing::debug!(project_id, state = %self.state, "Driving project");

        let mut items = self.ensure_extraction(project_id).await?;

        if self.state == WorkflowState::Reviewing {
            items = self.review.review(&self.api, project_id, items).await?;
            let selected = items.iter().filter(|i| i.selected).count();
            self.advance(WorkflowEvent::ConfirmSelection { selected })?;
            let status = self.api.confirm_selection(project_id).await?;
            self.expect_server(status.state)?;
            tracing::info!(project_id, selected, "Selection confirmed");
        }

        if self.state == WorkflowState::Questioning {
            self.answer_questions(project_id).await?;
        }

        let mut progress = Vec::new();
        let mut tracker = ProgressTracker::new();
        if self.state == WorkflowState::Planning {
            tracker = self.generate_plan(project_id, &mut progress).await?;
        }

        let project = self.api.get_project(project_id).await?;
        self.expect_server(project.status)?;
        if project.status != WorkflowState::Completed {
            return Err(CoreError::Conflict(format!(
                "Project {project_id} stopped in {} instead of completed",
                project.status
            ))
            .into());
        }

        let questions = match self.api.questions(project_id).await {
            Ok(questions) => questions,
            Err(e) if e.is_not_found() => Vec::new(),
            Err(e) => return Err(e),
        };
        let phases = self.api.phases(project_id).await?;
        tracing::info!(
            project_id,
            state = %self.state,
            phases = phases.len(),
            "Workflow finished",
        );

        Ok(WorkflowOutcome {
            project,
            items,
            questions,
            phases,
            progress,
            tracker,
        })
    }

    /// Return the extracted items, starting extraction and waiting for it
    /// when none exist yet or the project is still a draft.
    async fn ensure_extraction(&mut self, project_id: &str) -> ClientResult<Vec<ExtractedItem>> {
        match self.api.extraction_results(project_id).await {
            Ok(items) if !matches!(self.state, WorkflowState::Draft | WorkflowState::Extracting) => {
                return Ok(items)
            }
            Ok(_) => {}
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(e),
        }

        if self.state == WorkflowState::Draft {
            self.advance(WorkflowEvent::StartExtraction)?;
        }
        if self.state != WorkflowState::Extracting {
            return Err(CoreError::Conflict(format!(
                "Project {project_id} is {} but has no extraction results",
                self.state
            ))
            .into());
        }
        self.api.start_extraction(project_id).await?;
        tracing::info!(project_id, "Extraction started");

        let api = &self.api;
        let (items, server_state) =
            poll_until(&self.polling, "extraction results", &self.cancel, |attempt| async move {
                let items = match api.extraction_results(project_id).await {
                    Ok(items) => items,
                    Err(e) if e.is_not_found() => return Ok(None),
                    Err(e) => return Err(e),
                };
                // Items land just before the status flips.
                let status = api.workflow(project_id).await?;
                if status.state == WorkflowState::Extracting {
                    return Ok(None);
                }
                tracing::debug!(project_id, attempt, "Extraction results ready");
                Ok(Some((items, status.state)))
            })
            .await?;

        self.advance(WorkflowEvent::ExtractionReady)?;
        self.expect_server(server_state)?;
        Ok(items)
    }

    async fn answer_questions(&mut self, project_id: &str) -> ClientResult<()> {
        let mut resolved: HashSet<EntityId> = HashSet::new();
        loop {
            if self.cancel.is_cancelled() {
                return Err(ClientError::Cancelled);
            }
            let Some(question) = self.api.next_question(project_id).await? else {
                self.advance(WorkflowEvent::QuestionsExhausted)?;
                let status = self.api.workflow(project_id).await?;
                self.expect_server(status.state)?;
                tracing::info!(project_id, resolved = resolved.len(), "Questions exhausted");
                return Ok(());
            };

            if resolved.contains(&question.id) {
                return Err(CoreError::Conflict(format!(
                    "Question {} was presented again after being resolved",
                    question.id
                ))
                .into());
            }

            match self.answers.reply(&question).await {
                Reply::Answer(text) => {
                    self.api.answer_question(&question.id, &text).await?;
                }
                Reply::Skip => {
                    self.api.skip_question(&question.id).await?;
                }
            }
            tracing::debug!(project_id, question_id = %question.id, topic = %question.topic, "Question resolved");
            resolved.insert(question.id);
        }
    }

    async fn generate_plan(
        &mut self,
        project_id: &str,
        progress: &mut Vec<ProgressUpdate>,
    ) -> ClientResult<ProgressTracker> {
        match self.api.generate_plan(project_id).await {
            Ok(_) => tracing::info!(project_id, "Plan generation started"),
            Err(e) if e.status() == Some(409) => {
                tracing::warn!(project_id, error = %e, "Plan generation already running, following it");
            }
            Err(e) => return Err(e),
        }

        let mut subscription = ProgressSubscription::new(self.api.clone(), project_id)
            .with_cancellation(self.cancel.child_token());
        if let Some(policy) = &self.reconnect {
            subscription = subscription.with_reconnect_policy(policy.clone());
        }

        subscription
            .follow(|update, tracker| {
                tracing::info!(
                    project_id,
                    stage = update.event.stage.as_str(),
                    percent = tracker.percent(),
                    "{}",
                    update.event.message,
                );
                progress.push(update.clone());
            })
            .await?;

        self.advance(WorkflowEvent::PlanFinalized)?;
        Ok(subscription.tracker().clone())
    }

    fn advance(&mut self, event: WorkflowEvent) -> Result<(), CoreError> {
        self.state = transition(self.state, event)?;
        Ok(())
    }

    /// Fail when the server's state differs from the local one.
    fn expect_server(&self, server: WorkflowState) -> Result<(), CoreError> {
        if server != self.state {
            return Err(CoreError::Conflict(format!(
                "Server reports {server} but the workflow expected {}",
                self.state
            )));
        }
        Ok(())
    }
}
