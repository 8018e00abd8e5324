//! Rust client for the Blueprint planning API.
//!
//! [`ApiClient`] wraps the REST endpoints, [`ProgressSubscription`] follows
//! a project's progress stream with reconnect and resume, and
//! [`WorkflowOrchestrator`] strings them together to take a project from
//! idea to finished plan.

pub mod api;
pub mod error;
pub mod progress;
pub mod retry;
pub mod sse;
pub mod workflow;

pub use api::ApiClient;
pub use error::{ClientError, ClientResult};
pub use progress::{ProgressSubscription, ProgressUpdate};
pub use workflow::{AnswerSource, Reply, ReviewPolicy, WorkflowOrchestrator, WorkflowOutcome};
