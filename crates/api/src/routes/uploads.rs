use axum::routing::post;
use axum::Router;

use crate::handlers::upload;
use crate::state::AppState;

/// Routes mounted at `/uploads`.
///
/// ```text
/// POST   /sign                              -> sign
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/sign", post(upload::sign))
}
