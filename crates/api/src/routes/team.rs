//! Route definitions for `/team`.

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::handlers::team;
use crate::state::AppState;

/// Routes mounted at `/team`.
///
/// ```text
/// GET    /?projectId=                       -> list
/// POST   /invite                            -> invite
/// PUT    /{member_id}/role                  -> update_role
/// DELETE /{member_id}                       -> remove
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(team::list))
        .route("/invite", post(team::invite))
        .route("/{member_id}/role", put(team::update_role))
        .route("/{member_id}", delete(team::remove))
}
