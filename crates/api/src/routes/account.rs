//! Route definitions for `/account`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::account;
use crate::state::AppState;

/// Routes mounted at `/account`.
///
/// ```text
/// POST   /register                          -> register
/// POST   /login                             -> login
/// GET    /me                                -> me (auth required)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(account::register))
        .route("/login", post(account::login))
        .route("/me", get(account::me))
}
