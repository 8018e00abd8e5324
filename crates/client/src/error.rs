//! Client error type.

use blueprint_core::error::CoreError;

/// Errors from talking to the Blueprint API.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The API answered with a non-2xx status. `message` is the server's
    /// `error` text when the body carried one.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// A response or stream payload could not be decoded.
    #[error("Invalid payload: {0}")]
    Decode(#[from] serde_json::Error),

    /// A bounded wait ran out of attempts.
    #[error("Timed out waiting for {what} after {attempts} attempts")]
    TimedOut { what: &'static str, attempts: u32 },

    /// The progress stream could not be (re)established or broke off.
    #[error("Progress stream failed: {0}")]
    Stream(String),

    /// The caller cancelled the operation.
    #[error("Operation cancelled")]
    Cancelled,

    /// The server reported a state the local workflow machine rejects.
    #[error(transparent)]
    Workflow(#[from] CoreError),
}

impl ClientError {
    /// HTTP status of an [`ClientError::Api`] error.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
