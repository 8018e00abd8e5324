//! Signed upload handler.
//!
//! Hands the client a presigned form post in the shape of an S3 browser
//! upload and registers the file as a project document. Nothing is
//! uploaded through this server.

use axum::extract::State;
use axum::Json;
use blueprint_core::types::EntityId;
use blueprint_db::models::document::CreateDocument;
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sha2::Sha256;
use uuid::Uuid;

use crate::config::UploadConfig;
use crate::error::{AppError, AppResult};
use crate::handlers::find_project;
use crate::state::AppState;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNING_ALGORITHM: &str = "AWS4-HMAC-SHA256";

/// How long a signed policy stays valid.
const POLICY_TTL_MINUTES: i64 = 15;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignRequest {
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub project_id: Option<EntityId>,
}

/// Form fields the client posts along with the file.
#[derive(Debug, Serialize)]
pub struct UploadFields {
    #[serde(rename = "Content-Type")]
    pub content_type: String,
    pub key: String,
    pub bucket: String,
    #[serde(rename = "X-Upload-Id")]
    pub upload_id: String,
    pub policy: String,
    pub signature: String,
    #[serde(rename = "x-amz-algorithm")]
    pub algorithm: &'static str,
    #[serde(rename = "x-amz-credential")]
    pub credential: String,
    #[serde(rename = "x-amz-date")]
    pub date: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignResponse {
    pub url: String,
    pub fields: UploadFields,
    pub document_id: EntityId,
}

/// POST /api/uploads/sign
pub async fn sign(
    State(state): State<AppState>,
    Json(input): Json<SignRequest>,
) -> AppResult<Json<SignResponse>> {
    let (filename, content_type, project_id) = match (
        non_blank(input.filename),
        non_blank(input.content_type),
        non_blank(input.project_id),
    ) {
        (Some(f), Some(c), Some(p)) => (f, c, p),
        _ => {
            return Err(AppError::BadRequest(
                "Filename, content type, and project ID are required".into(),
            ))
        }
    };
    validate_filename(&filename)?;
    find_project(&state, &project_id).await?;

    let key = format!("projects/{project_id}/{filename}");
    let config = &state.config.uploads;
    let fields = sign_fields(config, &key, &content_type);

    let document = state
        .repos
        .documents
        .create(&CreateDocument {
            project_id: project_id.clone(),
            filename,
            content_type,
            storage_key: key,
        })
        .await?;

    tracing::info!(
        project_id = %project_id,
        document_id = %document.id,
        upload_id = %fields.upload_id,
        "Upload signed",
    );
    Ok(Json(SignResponse {
        url: format!("{}/{project_id}", config.base_url),
        fields,
        document_id: document.id,
    }))
}

/// Storage keys are `projects/{id}/{filename}`, so the name must stay a
/// single path segment.
fn validate_filename(filename: &str) -> AppResult<()> {
    let is_segment = !matches!(filename, "." | "..")
        && !filename
            .chars()
            .any(|c| c == '/' || c == '\\' || c.is_control());
    if !is_segment {
        return Err(AppError::BadRequest(format!(
            "Filename '{}' must be a plain file name without path separators",
            filename.escape_default()
        )));
    }
    Ok(())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Build the signed form fields for `key`.
///
/// The policy is the JSON policy document, hex encoded. The signature is the
/// hex HMAC-SHA256 of that encoded policy under the signing secret.
pub fn sign_fields(config: &UploadConfig, key: &str, content_type: &str) -> UploadFields {
    let now = Utc::now();
    let date = now.format("%Y%m%dT%H%M%SZ").to_string();
    let credential = format!(
        "{}/{}/blueprint/s3/aws4_request",
        config.bucket,
        now.format("%Y%m%d")
    );

    let policy_doc = json!({
        "expiration": (now + Duration::minutes(POLICY_TTL_MINUTES)).to_rfc3339(),
        "conditions": [
            { "bucket": config.bucket },
            { "key": key },
            { "Content-Type": content_type },
            { "x-amz-algorithm": SIGNING_ALGORITHM },
            { "x-amz-credential": credential },
            { "x-amz-date": date },
        ],
    });
    let policy = hex::encode(policy_doc.to_string());

    UploadFields {
        content_type: content_type.to_string(),
        key: key.to_string(),
        bucket: config.bucket.clone(),
        upload_id: format!("upload_{}", Uuid::new_v4()),
        signature: sign_policy(&config.signing_secret, &policy),
        policy,
        algorithm: SIGNING_ALGORITHM,
        credential,
        date,
    }
}

/// Hex HMAC-SHA256 of `policy`.
pub fn sign_policy(secret: &str, policy: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(policy.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

mod hex {
    /// Encode bytes as a lowercase hex string.
    pub fn encode(bytes: impl AsRef<[u8]>) -> String {
        bytes.as_ref().iter().map(|b| format!("{b:02x}")).collect()
    }
}
