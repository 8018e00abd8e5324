//! Phase and task entity models and DTOs.

use blueprint_core::types::{EntityId, Timestamp};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Phase {
    pub id: EntityId,
    pub project_id: EntityId,
    pub idx: i32,
    pub title: String,
    pub description: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: EntityId,
    pub project_id: EntityId,
    pub phase_id: EntityId,
    pub idx: i32,
    pub title: String,
    pub description: String,
    pub duration_days: u32,
    pub depends_on: Vec<EntityId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A phase with its tasks ordered by `idx`, as rendered on the plan board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseWithTasks {
    #[serde(flatten)]
    pub phase: Phase,
    pub tasks: Vec<Task>,
}

/// DTO for creating a phase. `idx` defaults to the next free index.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePhase {
    pub title: String,
    pub description: Option<String>,
    pub idx: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePhase {
    pub title: Option<String>,
    pub description: Option<String>,
    pub idx: Option<i32>,
}

/// DTO for creating a task inside a phase. `idx` defaults to the next free
/// index within the phase, `duration_days` to one day.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTask {
    pub title: String,
    pub description: Option<String>,
    pub duration_days: Option<u32>,
    #[serde(default)]
    pub depends_on: Vec<EntityId>,
    pub idx: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTask {
    pub title: Option<String>,
    pub description: Option<String>,
    pub duration_days: Option<u32>,
    pub depends_on: Option<Vec<EntityId>>,
    pub idx: Option<i32>,
}
