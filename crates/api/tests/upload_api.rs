//! Integration tests for `/api/uploads/sign` and document extraction.

mod common;

use axum::http::StatusCode;
use common::{body_json, create_project, extract, get, post_json};
use serde_json::json;

#[tokio::test]
async fn sign_returns_presigned_fields() {
    let app = common::build_test_app();
    let project = create_project(&app, "Uploads").await;
    let id = project["id"].as_str().unwrap();

    let response = post_json(
        app,
        "/api/uploads/sign",
        json!({ "filename": "brief.pdf", "contentType": "application/pdf", "projectId": id }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;

    assert_eq!(json["url"], format!("https://storage.test/upload/{id}"));
    assert!(json["documentId"].as_str().unwrap().starts_with("document_"));

    let fields = &json["fields"];
    assert_eq!(fields["key"], format!("projects/{id}/brief.pdf"));
    assert_eq!(fields["bucket"], "test-bucket");
    assert_eq!(fields["Content-Type"], "application/pdf");
    assert_eq!(fields["x-amz-algorithm"], "AWS4-HMAC-SHA256");
    assert_eq!(fields["x-amz-date"].as_str().unwrap().len(), 16);
    assert!(fields["X-Upload-Id"].as_str().unwrap().starts_with("upload_"));
    assert_eq!(fields["signature"].as_str().unwrap().len(), 64);
    assert!(fields["policy"].is_string());
    assert!(fields["x-amz-credential"].is_string());
}

#[tokio::test]
async fn sign_refuses_filenames_that_leave_the_project_prefix() {
    let app = common::build_test_app();
    let project = create_project(&app, "Uploads").await;
    let id = project["id"].as_str().unwrap();

    for filename in ["../other/brief.pdf", "nested/brief.pdf", ".."] {
        let response = post_json(
            app.clone(),
            "/api/uploads/sign",
            json!({ "filename": filename, "contentType": "application/pdf", "projectId": id }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{filename}");
        assert_eq!(body_json(response).await["code"], "BAD_REQUEST");
    }
}

#[tokio::test]
async fn sign_validates_input() {
    let app = common::build_test_app();

    let response = post_json(
        app.clone(),
        "/api/uploads/sign",
        json!({ "filename": "brief.pdf", "projectId": "project_1" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["error"],
        "Filename, content type, and project ID are required"
    );

    let response = post_json(
        app,
        "/api/uploads/sign",
        json!({ "filename": "brief.pdf", "contentType": "application/pdf", "projectId": "project_404" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn signed_documents_feed_extraction() {
    let app = common::build_test_app();
    let project = create_project(&app, "Docs").await;
    let id = project["id"].as_str().unwrap();

    let signed = body_json(
        post_json(
            app.clone(),
            "/api/uploads/sign",
            json!({ "filename": "requirements.docx", "contentType": "application/msword", "projectId": id }),
        )
        .await,
    )
    .await;

    extract(&app, id).await;

    let items = body_json(get(app, &format!("/api/ai/extract?projectId={id}")).await).await;
    let from_doc = items
        .as_array()
        .unwrap()
        .iter()
        .find(|i| i["source_document_id"] == signed["documentId"])
        .expect("an item should come from the uploaded document");
    assert_eq!(from_doc["value"], "requirements.docx");
}
