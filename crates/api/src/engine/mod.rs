//! Simulated AI work run as background jobs.
//!
//! - [`extraction`] -- turns idea text and documents into extracted items.
//! - [`planning`] -- expands the outline into phases and tasks while
//!   reporting progress.

pub mod extraction;
pub mod planning;

use blueprint_core::progress::ProgressEvent;

use crate::state::AppState;

/// Record a progress event, logging instead of failing on a regression.
pub async fn publish_progress(state: &AppState, project_id: &str, event: ProgressEvent) {
    let stage = event.stage.as_str();
    if let Err(e) = state.progress.record(project_id, event).await {
        tracing::warn!(project_id, stage, error = %e, "Dropped progress event");
    }
}
