//! Route definitions for the `/projects` resource.
//!
//! Also nests the workflow and plan editing routes under
//! `/projects/{id}/...`.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{plan, project, workflow};
use crate::state::AppState;

/// Routes mounted at `/projects`.
///
/// ```text
/// GET    /                                  -> list
/// POST   /                                  -> create
/// GET    /{id}                              -> get_by_id
/// PUT    /{id}                              -> update
/// DELETE /{id}                              -> delete
///
/// GET    /{id}/workflow                     -> workflow::get_state
/// POST   /{id}/workflow/confirm             -> workflow::confirm
/// POST   /{id}/workflow/restart             -> workflow::restart
///
/// GET    /{id}/phases                       -> plan::list_phases
/// POST   /{id}/phases                       -> plan::create_phase
/// PUT    /{id}/phases/{phase_id}            -> plan::update_phase
/// DELETE /{id}/phases/{phase_id}            -> plan::delete_phase
/// POST   /{id}/phases/{phase_id}/tasks      -> plan::create_task
/// PUT    /{id}/tasks/{task_id}              -> plan::update_task
/// DELETE /{id}/tasks/{task_id}              -> plan::delete_task
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(project::list).post(project::create))
        .route(
            "/{id}",
            get(project::get_by_id)
                .put(project::update)
                .delete(project::delete),
        )
        .route("/{id}/workflow", get(workflow::get_state))
        .route("/{id}/workflow/confirm", post(workflow::confirm))
        .route("/{id}/workflow/restart", post(workflow::restart))
        .route(
            "/{id}/phases",
            get(plan::list_phases).post(plan::create_phase),
        )
        .route(
            "/{id}/phases/{phase_id}",
            put(plan::update_phase).delete(plan::delete_phase),
        )
        .route("/{id}/phases/{phase_id}/tasks", post(plan::create_task))
        .route(
            "/{id}/tasks/{task_id}",
            put(plan::update_task).delete(plan::delete_task),
        )
}
