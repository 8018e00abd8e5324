//! Extraction job.

use blueprint_core::error::CoreError;
use blueprint_core::extraction::{DocumentRef, ExtractionInput};
use blueprint_core::progress::{ProgressEvent, ProgressStage};
use blueprint_core::types::EntityId;
use blueprint_core::workflow::{transition, WorkflowEvent, WorkflowState};
use blueprint_db::StoreError;

use crate::engine::publish_progress;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Run one extraction for a project in `extracting`.
///
/// Sleeps the simulated delay, stores the extractor's items (replacing any
/// earlier ones) and moves the project to `reviewing`. Nothing is stored
/// once the project has left `extracting`. Other failures are logged; the
/// project then stays in `extracting` until restarted.
pub async fn run(state: AppState, project_id: EntityId) {
    match extract(&state, &project_id).await {
        Ok(()) => {}
        Err(AppError::Store(StoreError::Conflict(reason))) => {
            tracing::info!(project_id = %project_id, reason = %reason, "Extraction result discarded");
        }
        Err(e) => {
            tracing::error!(project_id = %project_id, error = %e, "Extraction job failed");
        }
    }
}

async fn extract(state: &AppState, project_id: &str) -> AppResult<()> {
    publish_progress(
        state,
        project_id,
        ProgressEvent::new(ProgressStage::Extracting, "Extracting information from your idea"),
    )
    .await;

    tokio::time::sleep(state.config.simulation.extraction_delay).await;

    let project = state
        .repos
        .projects
        .find_by_id(project_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Project", project_id))?;
    let documents: Vec<DocumentRef> = state
        .repos
        .documents
        .list_by_project(project_id)
        .await?
        .into_iter()
        .map(|d| DocumentRef {
            id: d.id,
            filename: d.filename,
        })
        .collect();

    let drafts = state.extractor.extract(&ExtractionInput {
        idea_text: &project.idea_text,
        documents: &documents,
    });
    let items = state
        .repos
        .extractions
        .replace_for_project(project_id, WorkflowState::Extracting, &drafts)
        .await?;

    let next = transition(WorkflowState::Extracting, WorkflowEvent::ExtractionReady)?;
    state
        .repos
        .projects
        .update_status(project_id, WorkflowState::Extracting, next)
        .await?;

    let selected = items.iter().filter(|i| i.selected).count();
    tracing::info!(project_id, items = items.len(), selected, "Extraction finished");
    publish_progress(
        state,
        project_id,
        ProgressEvent::new(
            ProgressStage::Reviewing,
            format!("{} items ready for review", items.len()),
        ),
    )
    .await;
    Ok(())
}
