//! Route definitions for the simulated AI endpoints under `/ai`.

use axum::routing::{get, patch, post};
use axum::Router;

use crate::handlers::{extraction, plan, question};
use crate::state::AppState;

/// Routes mounted at `/ai`.
///
/// ```text
/// GET    /extract?projectId=                -> extraction::list
/// POST   /extract                           -> extraction::start
/// POST   /extract/select-all                -> extraction::select_all
/// PATCH  /extract/{item_id}                 -> extraction::toggle
///
/// GET    /questions?projectId=              -> question::list
/// POST   /questions/next                    -> question::next
/// POST   /questions/{id}/answer             -> question::answer
/// POST   /questions/{id}/skip               -> question::skip
///
/// POST   /plan/outline                      -> plan::generate_outline
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/extract", get(extraction::list).post(extraction::start))
        .route("/extract/select-all", post(extraction::select_all))
        .route("/extract/{item_id}", patch(extraction::toggle))
        .route("/questions", get(question::list))
        .route("/questions/next", post(question::next))
        .route("/questions/{id}/answer", post(question::answer))
        .route("/questions/{id}/skip", post(question::skip))
        .route("/plan/outline", post(plan::generate_outline))
}
