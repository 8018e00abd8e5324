//! Integration tests for manual phase and task editing.

mod common;

use axum::http::StatusCode;
use common::{body_json, create_project, delete, get, post_json, put_json};
use serde_json::{json, Value};

async fn setup() -> (axum::Router, String) {
    let app = common::build_test_app();
    let project = create_project(&app, "Plan Editing").await;
    let id = project["id"].as_str().unwrap().to_string();
    (app, id)
}

async fn add_phase(app: &axum::Router, project_id: &str, title: &str) -> Value {
    let response = post_json(
        app.clone(),
        &format!("/api/projects/{project_id}/phases"),
        json!({ "title": title }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

async fn add_task(
    app: &axum::Router,
    project_id: &str,
    phase_id: &str,
    title: &str,
    depends_on: &[&str],
) -> axum::response::Response {
    post_json(
        app.clone(),
        &format!("/api/projects/{project_id}/phases/{phase_id}/tasks"),
        json!({ "title": title, "duration_days": 2, "depends_on": depends_on }),
    )
    .await
}

// ---------------------------------------------------------------------------
// Phases
// ---------------------------------------------------------------------------

#[tokio::test]
async fn phases_get_sequential_indices() {
    let (app, id) = setup().await;
    let first = add_phase(&app, &id, "Discovery").await;
    let second = add_phase(&app, &id, "Build").await;
    assert!(second["idx"].as_i64().unwrap() > first["idx"].as_i64().unwrap());

    let phases = body_json(get(app, &format!("/api/projects/{id}/phases")).await).await;
    let titles: Vec<_> = phases.as_array().unwrap().iter().map(|p| p["title"].clone()).collect();
    assert_eq!(titles, vec![json!("Discovery"), json!("Build")]);
}

#[tokio::test]
async fn duplicate_phase_index_is_a_conflict() {
    let (app, id) = setup().await;
    let first = add_phase(&app, &id, "Discovery").await;

    let response = post_json(
        app,
        &format!("/api/projects/{id}/phases"),
        json!({ "title": "Clash", "idx": first["idx"] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn phase_title_is_required() {
    let (app, id) = setup().await;
    let response = post_json(app.clone(), &format!("/api/projects/{id}/phases"), json!({ "title": "" })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_json(app, "/api/projects/project_404/phases", json!({ "title": "x" })).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_and_delete_phase() {
    let (app, id) = setup().await;
    let phase = add_phase(&app, &id, "Draft title").await;
    let phase_id = phase["id"].as_str().unwrap();

    let response = put_json(
        app.clone(),
        &format!("/api/projects/{id}/phases/{phase_id}"),
        json!({ "title": "Final title", "description": "Refined" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["title"], "Final title");
    assert_eq!(json["description"], "Refined");

    let response = delete(app.clone(), &format!("/api/projects/{id}/phases/{phase_id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let response = delete(app, &format!("/api/projects/{id}/phases/{phase_id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn phases_are_scoped_to_their_project() {
    let (app, id) = setup().await;
    let other = create_project(&app, "Other").await;
    let other_id = other["id"].as_str().unwrap();
    let phase = add_phase(&app, &id, "Mine").await;
    let phase_id = phase["id"].as_str().unwrap();

    let response = put_json(
        app.clone(),
        &format!("/api/projects/{other_id}/phases/{phase_id}"),
        json!({ "title": "Stolen" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = add_task(&app, other_id, phase_id, "Sneaky", &[]).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

#[tokio::test]
async fn task_dependencies_must_exist() {
    let (app, id) = setup().await;
    let phase = add_phase(&app, &id, "Build").await;
    let phase_id = phase["id"].as_str().unwrap();

    let response = add_task(&app, &id, phase_id, "Orphan", &["task_999"]).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = add_task(&app, &id, phase_id, "Title", &[]).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let task = body_json(response).await;
    assert_eq!(task["duration_days"], 2);
    assert_eq!(task["phase_id"], phase_id);
}

#[tokio::test]
async fn dependencies_on_foreign_tasks_are_rejected() {
    let (app, id) = setup().await;
    let other = create_project(&app, "Other").await;
    let other_id = other["id"].as_str().unwrap();
    let other_phase = add_phase(&app, other_id, "Theirs").await;
    let foreign = body_json(add_task(&app, other_id, other_phase["id"].as_str().unwrap(), "Foreign", &[]).await).await;

    let phase = add_phase(&app, &id, "Mine").await;
    let response = add_task(
        &app,
        &id,
        phase["id"].as_str().unwrap(),
        "Cross",
        &[foreign["id"].as_str().unwrap()],
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn dependency_cycles_are_rejected() {
    let (app, id) = setup().await;
    let phase = add_phase(&app, &id, "Build").await;
    let phase_id = phase["id"].as_str().unwrap();

    let a = body_json(add_task(&app, &id, phase_id, "A", &[]).await).await;
    let a_id = a["id"].as_str().unwrap();
    let b = body_json(add_task(&app, &id, phase_id, "B", &[a_id]).await).await;
    let b_id = b["id"].as_str().unwrap();

    let response = put_json(
        app.clone(),
        &format!("/api/projects/{id}/tasks/{a_id}"),
        json!({ "depends_on": [b_id] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = put_json(
        app,
        &format!("/api/projects/{id}/tasks/{a_id}"),
        json!({ "depends_on": [a_id] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn deleting_a_task_drops_it_from_dependents() {
    let (app, id) = setup().await;
    let phase = add_phase(&app, &id, "Build").await;
    let phase_id = phase["id"].as_str().unwrap();

    let a = body_json(add_task(&app, &id, phase_id, "A", &[]).await).await;
    let a_id = a["id"].as_str().unwrap();
    let b = body_json(add_task(&app, &id, phase_id, "B", &[a_id]).await).await;

    let response = delete(app.clone(), &format!("/api/projects/{id}/tasks/{a_id}")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let phases = body_json(get(app, &format!("/api/projects/{id}/phases")).await).await;
    let tasks = phases[0]["tasks"].as_array().unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0]["id"], b["id"]);
    assert!(tasks[0]["depends_on"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn duplicate_task_index_is_a_conflict() {
    let (app, id) = setup().await;
    let phase = add_phase(&app, &id, "Build").await;
    let phase_id = phase["id"].as_str().unwrap();
    let a = body_json(add_task(&app, &id, phase_id, "A", &[]).await).await;
    let b = body_json(add_task(&app, &id, phase_id, "B", &[]).await).await;

    let response = put_json(
        app,
        &format!("/api/projects/{id}/tasks/{}", b["id"].as_str().unwrap()),
        json!({ "idx": a["idx"] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}
