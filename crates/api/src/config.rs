use std::time::Duration;

use blueprint_core::questions::DEFAULT_MAX_QUESTIONS;

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// How long shutdown waits for background jobs, in seconds (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// JWT token configuration (secret, lifetime).
    pub jwt: JwtConfig,
    /// Simulated AI timings and limits.
    pub simulation: SimulationConfig,
    /// Signed upload parameters.
    pub uploads: UploadConfig,
    /// Whether an AI provider key is configured. Only reported, never used.
    pub ai_provider_configured: bool,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:3000`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `SHUTDOWN_TIMEOUT_SECS`| `30`                       |
    /// | `AI_PROVIDER_KEY`      | unset                      |
    ///
    /// See [`JwtConfig::from_env`], [`SimulationConfig::from_env`] and
    /// [`UploadConfig::from_env`] for the nested sections.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let jwt = JwtConfig::from_env();
        let uploads = UploadConfig::from_env(&jwt.secret);

        let ai_provider_configured = std::env::var("AI_PROVIDER_KEY")
            .map(|k| !k.trim().is_empty())
            .unwrap_or(false);

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            jwt,
            simulation: SimulationConfig::from_env(),
            uploads,
            ai_provider_configured,
        }
    }
}

/// Delays that stand in for AI work, plus the question cap.
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// Time an extraction job takes before results appear.
    pub extraction_delay: Duration,
    /// Time spent "thinking" before a new question is returned.
    pub question_delay: Duration,
    /// Pause between plan generation progress stages.
    pub plan_step_delay: Duration,
    /// Most questions asked per project.
    pub max_questions: usize,
}

impl SimulationConfig {
    /// | Env Var               | Default |
    /// |-----------------------|---------|
    /// | `EXTRACTION_DELAY_MS` | `500`   |
    /// | `QUESTION_DELAY_MS`   | `200`   |
    /// | `PLAN_STEP_DELAY_MS`  | `300`   |
    /// | `MAX_QUESTIONS`       | `5`     |
    pub fn from_env() -> Self {
        Self {
            extraction_delay: env_millis("EXTRACTION_DELAY_MS", 500),
            question_delay: env_millis("QUESTION_DELAY_MS", 200),
            plan_step_delay: env_millis("PLAN_STEP_DELAY_MS", 300),
            max_questions: std::env::var("MAX_QUESTIONS")
                .unwrap_or_else(|_| DEFAULT_MAX_QUESTIONS.to_string())
                .parse()
                .expect("MAX_QUESTIONS must be a valid usize"),
        }
    }

    /// No delays at all.
    pub fn instant() -> Self {
        Self {
            extraction_delay: Duration::ZERO,
            question_delay: Duration::ZERO,
            plan_step_delay: Duration::ZERO,
            max_questions: DEFAULT_MAX_QUESTIONS,
        }
    }
}

fn env_millis(var: &str, default: u64) -> Duration {
    let ms: u64 = std::env::var(var)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .unwrap_or_else(|e| panic!("{var} must be a valid u64: {e}"));
    Duration::from_millis(ms)
}

/// Where signed uploads go and how their policies are signed.
#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub base_url: String,
    pub bucket: String,
    /// HMAC-SHA256 key for upload policies.
    pub signing_secret: String,
}

impl UploadConfig {
    /// | Env Var                 | Default                               |
    /// |-------------------------|---------------------------------------|
    /// | `UPLOAD_BASE_URL`       | `https://storage.example.com/upload`  |
    /// | `UPLOAD_BUCKET`         | `project-files`                       |
    /// | `UPLOAD_SIGNING_SECRET` | the JWT secret                        |
    pub fn from_env(fallback_secret: &str) -> Self {
        Self {
            base_url: std::env::var("UPLOAD_BASE_URL")
                .unwrap_or_else(|_| "https://storage.example.com/upload".into())
                .trim_end_matches('/')
                .to_string(),
            bucket: std::env::var("UPLOAD_BUCKET").unwrap_or_else(|_| "project-files".into()),
            signing_secret: std::env::var("UPLOAD_SIGNING_SECRET")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| fallback_secret.to_string()),
        }
    }
}
