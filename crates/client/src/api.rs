//! Typed wrapper over the Blueprint REST endpoints using [`reqwest`].

use blueprint_core::roles::MemberRole;
use blueprint_core::types::EntityId;
use blueprint_core::workflow::WorkflowState;
use blueprint_db::models::extracted_item::ExtractedItem;
use blueprint_db::models::plan::PhaseWithTasks;
use blueprint_db::models::project::Project;
use blueprint_db::models::question::Question;
use blueprint_db::models::team_member::TeamMember;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

use crate::error::{ClientError, ClientResult};

/// Request header carrying the last progress event id seen.
pub const LAST_EVENT_ID: &str = "Last-Event-ID";

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub store_healthy: bool,
}

/// Workflow view of a project.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WorkflowStatus {
    pub project_id: EntityId,
    pub state: WorkflowState,
    pub percent: f64,
    pub terminal: bool,
}

/// Acknowledgement for endpoints that start background work.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Started {
    pub message: String,
    pub project_id: EntityId,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerAck {
    pub message: String,
    pub question_id: EntityId,
    pub answer: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkipAck {
    pub message: String,
    pub question_id: EntityId,
}

/// Signed direct-upload form.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedUpload {
    pub url: String,
    pub fields: serde_json::Map<String, serde_json::Value>,
    pub document_id: EntityId,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountUser {
    pub id: EntityId,
    pub first_name: String,
    pub last_name: String,
    pub name: String,
    pub email: String,
    pub company: Option<String>,
}

/// Result of register and login.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user: AccountUser,
    pub service_token: String,
}

#[derive(Debug, Deserialize)]
struct ProjectList {
    projects: Vec<Project>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// HTTP client for one Blueprint API server.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// * `base_url` - Server origin, e.g. `http://localhost:3000`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Reuse an existing [`reqwest::Client`] (shared connection pool).
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client,
            base_url,
            token: None,
        }
    }

    /// Send `token` as a bearer credential on every request.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ---- health and accounts ----

    pub async fn health(&self) -> ClientResult<HealthStatus> {
        self.send_json(self.get("/health")).await
    }

    pub async fn login(&self, email: &str, password: &str) -> ClientResult<Session> {
        let body = json!({ "email": email, "password": password });
        self.send_json(self.post("/api/account/login").json(&body)).await
    }

    pub async fn register(
        &self,
        first_name: &str,
        last_name: &str,
        email: &str,
        password: &str,
    ) -> ClientResult<Session> {
        let body = json!({
            "firstName": first_name,
            "lastName": last_name,
            "email": email,
            "password": password,
        });
        self.send_json(self.post("/api/account/register").json(&body)).await
    }

    // ---- projects ----

    pub async fn create_project(&self, name: &str, idea_text: &str) -> ClientResult<Project> {
        let body = json!({ "name": name, "idea_text": idea_text });
        self.send_json(self.post("/api/projects").json(&body)).await
    }

    pub async fn list_projects(&self) -> ClientResult<Vec<Project>> {
        let list: ProjectList = self.send_json(self.get("/api/projects")).await?;
        Ok(list.projects)
    }

    pub async fn get_project(&self, id: &str) -> ClientResult<Project> {
        self.send_json(self.get(&format!("/api/projects/{id}"))).await
    }

    pub async fn rename_project(&self, id: &str, name: &str) -> ClientResult<Project> {
        let body = json!({ "name": name });
        self.send_json(self.put(&format!("/api/projects/{id}")).json(&body))
            .await
    }

    pub async fn delete_project(&self, id: &str) -> ClientResult<()> {
        self.send_empty(self.delete(&format!("/api/projects/{id}")))
            .await
    }

    // ---- workflow ----

    pub async fn workflow(&self, project_id: &str) -> ClientResult<WorkflowStatus> {
        self.send_json(self.get(&format!("/api/projects/{project_id}/workflow")))
            .await
    }

    pub async fn confirm_selection(&self, project_id: &str) -> ClientResult<WorkflowStatus> {
        self.send_json(self.post(&format!("/api/projects/{project_id}/workflow/confirm")))
            .await
    }

    pub async fn restart(&self, project_id: &str) -> ClientResult<WorkflowStatus> {
        self.send_json(self.post(&format!("/api/projects/{project_id}/workflow/restart")))
            .await
    }

    // ---- extraction ----

    /// Extracted items; a 404 means extraction has not produced results yet.
    pub async fn extraction_results(&self, project_id: &str) -> ClientResult<Vec<ExtractedItem>> {
        let request = self.get("/api/ai/extract").query(&[("projectId", project_id)]);
        self.send_json(request).await
    }

    pub async fn start_extraction(&self, project_id: &str) -> ClientResult<Started> {
        let body = json!({ "projectId": project_id });
        self.send_json(self.post("/api/ai/extract").json(&body)).await
    }

    /// Set an item's selection, or toggle it when `selected` is `None`.
    pub async fn set_item_selected(
        &self,
        item_id: &str,
        selected: Option<bool>,
    ) -> ClientResult<ExtractedItem> {
        let body = match selected {
            Some(selected) => json!({ "selected": selected }),
            None => json!({}),
        };
        self.send_json(self.patch(&format!("/api/ai/extract/{item_id}")).json(&body))
            .await
    }

    pub async fn select_all(
        &self,
        project_id: &str,
        selected: bool,
    ) -> ClientResult<Vec<ExtractedItem>> {
        let body = json!({ "projectId": project_id, "selected": selected });
        self.send_json(self.post("/api/ai/extract/select-all").json(&body))
            .await
    }

    // ---- questions ----

    pub async fn questions(&self, project_id: &str) -> ClientResult<Vec<Question>> {
        let request = self
            .get("/api/ai/questions")
            .query(&[("projectId", project_id)]);
        self.send_json(request).await
    }

    /// The next question to answer, or `None` once the bank is exhausted.
    pub async fn next_question(&self, project_id: &str) -> ClientResult<Option<Question>> {
        let body = json!({ "projectId": project_id });
        let response = Self::ensure_success(
            self.post("/api/ai/questions/next").json(&body).send().await?,
        )
        .await?;
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        Ok(Some(response.json().await?))
    }

    pub async fn answer_question(&self, question_id: &str, answer: &str) -> ClientResult<AnswerAck> {
        let body = json!({ "answer": answer });
        self.send_json(
            self.post(&format!("/api/ai/questions/{question_id}/answer"))
                .json(&body),
        )
        .await
    }

    pub async fn skip_question(&self, question_id: &str) -> ClientResult<SkipAck> {
        self.send_json(self.post(&format!("/api/ai/questions/{question_id}/skip")))
            .await
    }

    // ---- plan ----

    pub async fn generate_plan(&self, project_id: &str) -> ClientResult<Started> {
        let body = json!({ "projectId": project_id });
        self.send_json(self.post("/api/ai/plan/outline").json(&body))
            .await
    }

    pub async fn phases(&self, project_id: &str) -> ClientResult<Vec<PhaseWithTasks>> {
        self.send_json(self.get(&format!("/api/projects/{project_id}/phases")))
            .await
    }

    // ---- team and uploads ----

    pub async fn team(&self, project_id: &str) -> ClientResult<Vec<TeamMember>> {
        let request = self.get("/api/team").query(&[("projectId", project_id)]);
        self.send_json(request).await
    }

    pub async fn invite(
        &self,
        project_id: &str,
        email: &str,
        role: MemberRole,
    ) -> ClientResult<TeamMember> {
        let body = json!({ "projectId": project_id, "email": email, "role": role });
        self.send_json(self.post("/api/team/invite").json(&body)).await
    }

    pub async fn sign_upload(
        &self,
        project_id: &str,
        filename: &str,
        content_type: &str,
    ) -> ClientResult<SignedUpload> {
        let body = json!({
            "projectId": project_id,
            "filename": filename,
            "contentType": content_type,
        });
        self.send_json(self.post("/api/uploads/sign").json(&body)).await
    }

    // ---- progress ----

    /// Open the raw SSE response for a project's progress, resuming after
    /// `last_event_id` when given.
    pub async fn open_progress_stream(
        &self,
        project_id: &str,
        last_event_id: Option<u64>,
    ) -> ClientResult<reqwest::Response> {
        let mut request = self
            .get("/api/progress/stream")
            .query(&[("projectId", project_id)])
            .header(ACCEPT, "text/event-stream");
        if let Some(id) = last_event_id {
            request = request.header(LAST_EVENT_ID, id.to_string());
        }
        Self::ensure_success(request.send().await?).await
    }

    // ---- private helpers ----

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.header(AUTHORIZATION, format!("Bearer {token}")),
            None => request,
        }
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.authorize(self.client.get(self.url(path)))
    }

    fn post(&self, path: &str) -> RequestBuilder {
        self.authorize(self.client.post(self.url(path)))
    }

    fn put(&self, path: &str) -> RequestBuilder {
        self.authorize(self.client.put(self.url(path)))
    }

    fn patch(&self, path: &str) -> RequestBuilder {
        self.authorize(self.client.patch(self.url(path)))
    }

    fn delete(&self, path: &str) -> RequestBuilder {
        self.authorize(self.client.delete(self.url(path)))
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> ClientResult<T> {
        let response = Self::ensure_success(request.send().await?).await?;
        Ok(response.json().await?)
    }

    async fn send_empty(&self, request: RequestBuilder) -> ClientResult<()> {
        Self::ensure_success(request.send().await?).await?;
        Ok(())
    }

    /// Pass a 2xx response through; turn anything else into
    /// [`ClientError::Api`] carrying the server's `error` message.
    async fn ensure_success(response: reqwest::Response) -> ClientResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ClientError::Api {
            status: status.as_u16(),
            message: error_message(&body),
        })
    }
}

/// The `error` field of a JSON error body, or the raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.error)
        .unwrap_or_else(|_| body.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_prefers_the_error_field() {
        let body = r#"{"error":"Project not found","code":"NOT_FOUND"}"#;
        assert_eq!(error_message(body), "Project not found");
        assert_eq!(error_message(" upstream down \n"), "upstream down");
    }

    #[test]
    fn base_url_trailing_slash_is_dropped() {
        let client = ApiClient::new("http://localhost:3000/");
        assert_eq!(client.base_url(), "http://localhost:3000");
        assert_eq!(client.url("/health"), "http://localhost:3000/health");
    }

    #[test]
    fn workflow_status_decodes() {
        let status: WorkflowStatus = serde_json::from_str(
            r#"{"project_id":"project_1","state":"reviewing","percent":40.0,"terminal":false}"#,
        )
        .unwrap();
        assert_eq!(status.state, WorkflowState::Reviewing);
        assert!(!status.terminal);
    }
}
