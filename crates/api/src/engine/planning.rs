//! Plan generation job.

use blueprint_core::error::CoreError;
use blueprint_core::planning::{build_outline, PlanInputs};
use blueprint_core::progress::{ProgressEvent, ProgressStage};
use blueprint_core::types::EntityId;
use blueprint_core::workflow::{transition, WorkflowEvent, WorkflowState};
use blueprint_db::models::question::QuestionStatus;
use blueprint_db::StoreError;

use crate::engine::publish_progress;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Generate and store the plan of a project in `planning`.
///
/// Reports `generating_phases`, one `expanding_phase` per phase and, once
/// the plan is stored and the project is `completed`, `finalizing`. The plan
/// is only stored while the project is still in `planning`.
pub async fn run(state: AppState, project_id: EntityId) {
    match generate(&state, &project_id).await {
        Ok(()) => {}
        Err(AppError::Store(StoreError::Conflict(reason))) => {
            tracing::info!(project_id = %project_id, reason = %reason, "Generated plan discarded");
        }
        Err(e) => {
            tracing::error!(project_id = %project_id, error = %e, "Plan generation failed");
        }
    }
}

async fn generate(state: &AppState, project_id: &str) -> AppResult<()> {
    let step = state.config.simulation.plan_step_delay;
    let project = state
        .repos
        .projects
        .find_by_id(project_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Project", project_id))?;

    let selected_items: Vec<(String, String)> = state
        .repos
        .extractions
        .list_by_project(project_id)
        .await?
        .into_iter()
        .filter(|i| i.selected)
        .map(|i| (i.label, i.value))
        .collect();
    let answers: Vec<(String, String)> = state
        .repos
        .questions
        .list_by_project(project_id)
        .await?
        .into_iter()
        .filter(|q| q.status == QuestionStatus::Answered)
        .filter_map(|q| q.answer_text.map(|a| (q.topic, a)))
        .collect();

    let outline = build_outline(&PlanInputs {
        project_name: &project.name,
        selected_items: &selected_items,
        answers: &answers,
    });
    let total = outline.len() as u32;

    publish_progress(
        state,
        project_id,
        ProgressEvent::new(
            ProgressStage::GeneratingPhases,
            format!("Generating {total} project phases"),
        )
        .with_total_phases(total),
    )
    .await;
    tokio::time::sleep(step).await;

    for (i, phase) in outline.iter().enumerate() {
        let number = i as u32 + 1;
        publish_progress(
            state,
            project_id,
            ProgressEvent::new(
                ProgressStage::ExpandingPhase,
                format!("Expanding phase {number} of {total}: {}", phase.title),
            )
            .with_phase(number, total),
        )
        .await;
        tokio::time::sleep(step).await;
    }

    let plan = state
        .repos
        .plans
        .replace_plan(project_id, WorkflowState::Planning, &outline)
        .await?;
    let next = transition(WorkflowState::Planning, WorkflowEvent::PlanFinalized)?;
    state
        .repos
        .projects
        .update_status(project_id, WorkflowState::Planning, next)
        .await?;

    let tasks: usize = plan.iter().map(|p| p.tasks.len()).sum();
    tracing::info!(project_id, phases = plan.len(), tasks, "Plan generated");
    publish_progress(
        state,
        project_id,
        ProgressEvent::new(
            ProgressStage::Finalizing,
            format!("Plan ready with {} phases and {tasks} tasks", plan.len()),
        )
        .with_phase(total, total),
    )
    .await;
    Ok(())
}
