//! Handlers for the `/account` resource (register, login, me).

use axum::extract::State;
use axum::Json;
use blueprint_core::error::CoreError;
use blueprint_core::validation::validate_email;
use blueprint_db::models::user::{CreateUser, User};
use blueprint_db::StoreError;
use serde::{Deserialize, Serialize};

use crate::auth::jwt::generate_service_token;
use crate::auth::password::{hash_password, verify_password};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub company: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Returned by register and login.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    pub message: &'static str,
    pub user: User,
    pub service_token: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/account/register
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterRequest>,
) -> AppResult<Json<AccountResponse>> {
    let field = |v: Option<String>| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
    let (Some(first_name), Some(last_name), Some(email), Some(password)) = (
        field(input.first_name),
        field(input.last_name),
        field(input.email),
        input.password.filter(|p| !p.is_empty()),
    ) else {
        return Err(AppError::BadRequest("Missing required fields".into()));
    };
    validate_email(&email)?;

    let password_hash = hash_password(&password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = state
        .repos
        .users
        .create(&CreateUser {
            first_name,
            last_name,
            email,
            company: field(input.company),
            password_hash,
        })
        .await
        .map_err(|e| match e {
            StoreError::Conflict(_) => AppError::Core(CoreError::Conflict(
                "User already exists with this email".into(),
            )),
            other => other.into(),
        })?;

    let service_token = issue_token(&state, &user)?;
    tracing::info!(user_id = %user.id, "User registered");
    Ok(Json(AccountResponse {
        message: "User registered successfully",
        user,
        service_token,
    }))
}

/// POST /api/account/login
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<AccountResponse>> {
    let (Some(email), Some(password)) = (
        input.email.filter(|e| !e.trim().is_empty()),
        input.password.filter(|p| !p.is_empty()),
    ) else {
        return Err(AppError::BadRequest("Email and password are required".into()));
    };

    let invalid = || AppError::Core(CoreError::Unauthorized("Invalid email or password".into()));

    let user = state
        .repos
        .users
        .find_by_email(email.trim())
        .await?
        .ok_or_else(invalid)?;

    let password_valid = verify_password(&password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        tracing::debug!(user_id = %user.id, "Login rejected");
        return Err(invalid());
    }

    let service_token = issue_token(&state, &user)?;
    tracing::info!(user_id = %user.id, "User logged in");
    Ok(Json(AccountResponse {
        message: "Login successful",
        user,
        service_token,
    }))
}

/// GET /api/account/me
pub async fn me(State(state): State<AppState>, auth: AuthUser) -> AppResult<Json<User>> {
    let user = state
        .repos
        .users
        .find_by_id(&auth.user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("Account no longer exists".into())))?;
    Ok(Json(user))
}

fn issue_token(state: &AppState, user: &User) -> AppResult<String> {
    generate_service_token(&user.id, &user.email, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))
}
