pub mod account;
pub mod ai;
pub mod chat;
pub mod health;
pub mod progress;
pub mod project;
pub mod team;
pub mod uploads;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /projects                                        list, create
/// /projects/{id}                                   get, update, delete
/// /projects/{id}/workflow                          workflow state
/// /projects/{id}/workflow/confirm                  confirm review (POST)
/// /projects/{id}/workflow/restart                  restart analysis (POST)
/// /projects/{id}/phases                            list, create
/// /projects/{id}/phases/{phase_id}                 update, delete
/// /projects/{id}/phases/{phase_id}/tasks           create task (POST)
/// /projects/{id}/tasks/{task_id}                   update, delete
///
/// /ai/extract                                      results (GET), start (POST)
/// /ai/extract/select-all                           bulk select (POST)
/// /ai/extract/{item_id}                            toggle selection (PATCH)
/// /ai/questions                                    list asked questions
/// /ai/questions/next                               next question (POST)
/// /ai/questions/{id}/answer                        answer (POST)
/// /ai/questions/{id}/skip                          skip (POST)
/// /ai/plan/outline                                 start plan generation (POST)
///
/// /team                                            list members
/// /team/invite                                     invite (POST)
/// /team/{member_id}                                remove (DELETE)
/// /team/{member_id}/role                           change role (PUT)
///
/// /uploads/sign                                    presigned upload (POST)
///
/// /progress                                        snapshot
/// /progress/stream                                 server-sent events
///
/// /account/register                                register (POST)
/// /account/login                                   login (POST)
/// /account/me                                      current user (auth required)
///
/// /chat/users                                      contacts
/// /chat/filter                                     history with a contact (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/projects", project::router())
        .nest("/ai", ai::router())
        .nest("/team", team::router())
        .nest("/uploads", uploads::router())
        .nest("/progress", progress::router())
        .nest("/account", account::router())
        .nest("/chat", chat::router())
}
