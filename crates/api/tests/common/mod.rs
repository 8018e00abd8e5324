#![allow(dead_code)]

use std::time::Duration;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use blueprint_api::auth::jwt::JwtConfig;
use blueprint_api::bootstrap::seed_demo_users;
use blueprint_api::config::{ServerConfig, SimulationConfig, UploadConfig};
use blueprint_api::router::build_app_router;
use blueprint_api::state::AppState;
use blueprint_db::Repositories;

pub const TEST_JWT_SECRET: &str = "test-secret-for-integration-tests";

/// Build a test `ServerConfig` with safe defaults and no simulated delays.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3000".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
        jwt: JwtConfig {
            secret: TEST_JWT_SECRET.to_string(),
            token_expiry_secs: 3600,
        },
        simulation: SimulationConfig::instant(),
        uploads: UploadConfig {
            base_url: "https://storage.test/upload".to_string(),
            bucket: "test-bucket".to_string(),
            signing_secret: "upload-secret".to_string(),
        },
        ai_provider_configured: false,
    }
}

/// Fresh state over an empty in-memory store.
pub fn test_state() -> AppState {
    AppState::new(test_config(), Repositories::in_memory())
}

/// Build the full application router over a fresh, empty store.
///
/// Uses the same [`build_app_router`] as `main.rs`, so tests exercise the
/// production middleware stack. Clones of the returned router share state.
pub fn build_test_app() -> Router {
    build_test_app_with_state(test_state())
}

pub fn build_test_app_with_state(state: AppState) -> Router {
    build_app_router(state, &test_config())
}

/// Like [`build_test_app`], with the demo accounts registered.
pub async fn build_seeded_app() -> Router {
    let state = test_state();
    seed_demo_users(&state.repos)
        .await
        .expect("seeding demo users should succeed");
    build_test_app_with_state(state)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

async fn send_json(app: Router, method: Method, uri: &str, body: serde_json::Value) -> Response {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send_json(app, Method::POST, uri, body).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn put_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send_json(app, Method::PUT, uri, body).await
}

pub async fn patch_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send_json(app, Method::PATCH, uri, body).await
}

pub async fn delete(app: Router, uri: &str) -> Response {
    let request = Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_text(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

// ---------------------------------------------------------------------------
// Workflow helpers
// ---------------------------------------------------------------------------

pub const IDEA: &str = "A marketplace for local farmers to sell produce directly. \
    Built with React and Node.js for small restaurants. \
    Features: ordering, payments and delivery tracking. \
    Launch in 3 months with a budget of $50,000.";

/// Create a project and return its JSON.
pub async fn create_project(app: &Router, name: &str) -> serde_json::Value {
    let response = post_json(
        app.clone(),
        "/api/projects",
        serde_json::json!({ "name": name, "idea_text": IDEA }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

/// Poll the project until it reaches `status`, panicking after two seconds.
pub async fn wait_for_status(app: &Router, project_id: &str, status: &str) -> serde_json::Value {
    for _ in 0..200 {
        let project = body_json(get(app.clone(), &format!("/api/projects/{project_id}")).await).await;
        if project["status"] == status {
            return project;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("project {project_id} never reached {status}");
}

/// Run extraction and wait for `reviewing`.
pub async fn extract(app: &Router, project_id: &str) {
    let response = post_json(
        app.clone(),
        "/api/ai/extract",
        serde_json::json!({ "projectId": project_id }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    wait_for_status(app, project_id, "reviewing").await;
}

/// Answer every question until the bank is exhausted. Returns the ids asked.
pub async fn answer_all(app: &Router, project_id: &str) -> Vec<String> {
    let mut asked = Vec::new();
    loop {
        let response = post_json(
            app.clone(),
            "/api/ai/questions/next",
            serde_json::json!({ "projectId": project_id }),
        )
        .await;
        if response.status() == StatusCode::NO_CONTENT {
            return asked;
        }
        assert_eq!(response.status(), StatusCode::OK);
        let question = body_json(response).await;
        let id = question["id"].as_str().unwrap().to_string();
        let response = post_json(
            app.clone(),
            &format!("/api/ai/questions/{id}/answer"),
            serde_json::json!({ "answer": "Grow repeat orders" }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        asked.push(id);
    }
}

/// Drive a new project all the way to `completed`. Returns its id.
pub async fn complete_project(app: &Router, name: &str) -> String {
    let project = create_project(app, name).await;
    let id = project["id"].as_str().unwrap().to_string();
    extract(app, &id).await;

    let response = post_json(
        app.clone(),
        &format!("/api/projects/{id}/workflow/confirm"),
        serde_json::json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    answer_all(app, &id).await;
    wait_for_status(app, &id, "planning").await;

    let response = post_json(
        app.clone(),
        "/api/ai/plan/outline",
        serde_json::json!({ "projectId": id }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    wait_for_status(app, &id, "completed").await;
    wait_for_progress_finished(app, &id).await;
    id
}

/// Poll the progress snapshot until the final stage has been recorded.
pub async fn wait_for_progress_finished(app: &Router, project_id: &str) -> serde_json::Value {
    for _ in 0..200 {
        let snapshot =
            body_json(get(app.clone(), &format!("/api/progress?projectId={project_id}")).await).await;
        if snapshot["finished"] == true {
            return snapshot;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("progress of {project_id} never finished");
}
