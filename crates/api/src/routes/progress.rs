use axum::routing::get;
use axum::Router;

use crate::handlers::progress;
use crate::state::AppState;

/// Routes mounted at `/progress`.
///
/// ```text
/// GET    /?projectId=                       -> snapshot
/// GET    /stream?projectId=                 -> stream (text/event-stream)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(progress::snapshot))
        .route("/stream", get(progress::stream))
}
