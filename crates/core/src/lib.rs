//! Blueprint domain layer.
//!
//! Pure logic shared by the API server and the client: the project workflow
//! state machine, team role rules, progress stages, retry policy, and the
//! deterministic extraction, question and planning engines. Nothing in this
//! crate performs I/O.

pub mod error;
pub mod extraction;
pub mod planning;
pub mod progress;
pub mod questions;
pub mod retry;
pub mod roles;
pub mod types;
pub mod validation;
pub mod workflow;
