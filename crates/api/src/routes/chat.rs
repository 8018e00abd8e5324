use axum::routing::{get, post};
use axum::Router;

use crate::handlers::chat;
use crate::state::AppState;

/// Routes mounted at `/chat`.
///
/// ```text
/// GET    /users                             -> users
/// POST   /filter                            -> filter
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(chat::users))
        .route("/filter", post(chat::filter))
}
