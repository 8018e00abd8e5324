//! Tests for `AppError` → HTTP response mapping.
//!
//! These call `IntoResponse` directly on `AppError` values; no router is
//! involved.

use assert_matches::assert_matches;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use blueprint_api::error::AppError;
use blueprint_core::error::CoreError;
use blueprint_db::StoreError;
use http_body_util::BodyExt;

/// Helper: convert an `AppError` into its status code and parsed JSON body.
async fn error_to_response(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

#[test]
fn domain_and_store_errors_convert_into_their_variants() {
    assert_matches!(
        AppError::from(CoreError::not_found("Project", "project_1")),
        AppError::Core(CoreError::NotFound { entity: "Project", .. })
    );
    assert_matches!(
        AppError::from(StoreError::Conflict("Project project_1 is draft".into())),
        AppError::Store(StoreError::Conflict(msg)) if msg.contains("draft")
    );
    assert_matches!(
        AppError::from(StoreError::Rejected(CoreError::Forbidden("owner".into()))),
        AppError::Store(StoreError::Rejected(CoreError::Forbidden(_)))
    );
}

// ---------------------------------------------------------------------------
// Core errors
// ---------------------------------------------------------------------------

#[tokio::test]
async fn not_found_error_returns_404() {
    let (status, json) = error_to_response(CoreError::not_found("Project", "project_42").into()).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "Project with id project_42 not found");
}

#[tokio::test]
async fn validation_error_returns_400() {
    let (status, json) =
        error_to_response(CoreError::Validation("name is required".into()).into()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["error"], "name is required");
}

#[tokio::test]
async fn bad_request_error_returns_400() {
    let (status, json) = error_to_response(AppError::BadRequest("Project ID is required".into())).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn unauthorized_and_forbidden_map_to_401_and_403() {
    let (status, _) = error_to_response(CoreError::Unauthorized("no".into()).into()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, json) = error_to_response(CoreError::Forbidden("owner".into()).into()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["code"], "FORBIDDEN");
}

#[tokio::test]
async fn internal_error_returns_500_and_sanitizes_message() {
    let (status, json) =
        error_to_response(AppError::InternalError("secret signing key leaked".into())).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "INTERNAL_ERROR");
    assert_eq!(json["error"], "An internal error occurred");
}

// ---------------------------------------------------------------------------
// Store errors
// ---------------------------------------------------------------------------

#[tokio::test]
async fn store_conflict_returns_409() {
    let (status, json) =
        error_to_response(StoreError::Conflict("Email already exists".into()).into()).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["error"], "Email already exists");
}

#[tokio::test]
async fn store_rejection_maps_like_the_domain_error() {
    let err = StoreError::Rejected(CoreError::Forbidden("The project owner cannot be removed".into()));
    let (status, json) = error_to_response(err.into()).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["error"], "The project owner cannot be removed");
}

#[tokio::test]
async fn store_integrity_error_is_sanitized() {
    let (status, json) =
        error_to_response(StoreError::Integrity("dangling task_7".into()).into()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "An internal error occurred");
}
