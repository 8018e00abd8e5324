//! Per-project progress log on top of the [`EventBus`].
//!
//! Every recorded event gets the next hub-wide sequence number, is appended
//! to its project's log and then broadcast. The log lets a late or
//! reconnecting subscriber replay what it missed. A project's log runs
//! through a [`ProgressTracker`], so stage regressions are refused before
//! anything is published.

use std::collections::HashMap;

use blueprint_core::error::CoreError;
use blueprint_core::progress::{ProgressEvent, ProgressStage, ProgressTracker};
use blueprint_core::types::EntityId;
use serde::Serialize;
use tokio::sync::{broadcast, Mutex};

use crate::bus::{EventBus, ProgressNotice};

#[derive(Debug, Default)]
struct ProjectLog {
    tracker: ProgressTracker,
    notices: Vec<ProgressNotice>,
}

#[derive(Debug, Default)]
struct HubState {
    last_seq: u64,
    logs: HashMap<EntityId, ProjectLog>,
}

/// Derived view of a project's progress.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressSnapshot {
    pub project_id: EntityId,
    pub stage: Option<ProgressStage>,
    pub message: String,
    pub percent: f64,
    pub current_phase: u32,
    pub total_phases: u32,
    pub finished: bool,
    pub last_seq: Option<u64>,
}

/// Progress fan-out with replay.
#[derive(Default)]
pub struct ProgressHub {
    bus: EventBus,
    state: Mutex<HubState>,
}

impl ProgressHub {
    pub fn new(bus: EventBus) -> Self {
        Self {
            bus,
            state: Mutex::default(),
        }
    }

    /// Record and broadcast `event` for `project_id`.
    ///
    /// Returns a `Conflict` error, without publishing, when the event's stage
    /// is earlier than the project's current stage.
    pub async fn record(
        &self,
        project_id: &str,
        event: ProgressEvent,
    ) -> Result<ProgressNotice, CoreError> {
        let mut state = self.state.lock().await;
        let HubState { last_seq, logs } = &mut *state;
        let log = logs.entry(project_id.to_string()).or_default();
        log.tracker.record(event.clone())?;

        *last_seq += 1;
        let notice = ProgressNotice {
            project_id: project_id.to_string(),
            seq: *last_seq,
            event,
        };
        log.notices.push(notice.clone());
        // Publish while holding the lock so broadcast order matches seq order.
        self.bus.publish(notice.clone());

        tracing::debug!(
            project_id,
            seq = notice.seq,
            stage = notice.event.stage.as_str(),
            "Progress recorded",
        );
        Ok(notice)
    }

    /// Subscribe to live notices for every project.
    ///
    /// Subscribe before calling [`replay`](Self::replay) and drop live
    /// notices whose `seq` was already replayed; nothing is missed that way.
    pub fn subscribe(&self) -> broadcast::Receiver<ProgressNotice> {
        self.bus.subscribe()
    }

    /// Logged notices of a project with `seq` greater than `after`.
    pub async fn replay(&self, project_id: &str, after: Option<u64>) -> Vec<ProgressNotice> {
        let state = self.state.lock().await;
        let after = after.unwrap_or(0);
        state
            .logs
            .get(project_id)
            .map(|log| {
                log.notices
                    .iter()
                    .filter(|n| n.seq > after)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    pub async fn snapshot(&self, project_id: &str) -> ProgressSnapshot {
        let state = self.state.lock().await;
        let empty = ProjectLog::default();
        let log = state.logs.get(project_id).unwrap_or(&empty);
        ProgressSnapshot {
            project_id: project_id.to_string(),
            stage: log.tracker.current_stage(),
            message: log.tracker.message().to_string(),
            percent: log.tracker.percent(),
            current_phase: log.tracker.current_phase(),
            total_phases: log.tracker.total_phases(),
            finished: log.tracker.is_finished(),
            last_seq: log.notices.last().map(|n| n.seq),
        }
    }

    /// Forget a project's log, e.g. on restart or delete. Sequence numbers
    /// keep increasing across resets.
    pub async fn reset(&self, project_id: &str) {
        let removed = self.state.lock().await.logs.remove(project_id);
        if removed.is_some() {
            tracing::debug!(project_id, "Progress log cleared");
        }
    }
}
