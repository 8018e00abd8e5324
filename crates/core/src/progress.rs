//! Plan-generation progress stages and the tracker that folds a stream of
//! progress events into a current stage and completion percentage.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Stages
// ---------------------------------------------------------------------------

/// The fixed six-stage sequence reported while a plan is being built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStage {
    Extracting,
    Reviewing,
    Questioning,
    GeneratingPhases,
    ExpandingPhase,
    Finalizing,
}

/// All stages in order.
pub const STAGES: [ProgressStage; 6] = [
    ProgressStage::Extracting,
    ProgressStage::Reviewing,
    ProgressStage::Questioning,
    ProgressStage::GeneratingPhases,
    ProgressStage::ExpandingPhase,
    ProgressStage::Finalizing,
];

impl ProgressStage {
    /// Zero-based position in [`STAGES`].
    pub fn position(self) -> usize {
        match self {
            Self::Extracting => 0,
            Self::Reviewing => 1,
            Self::Questioning => 2,
            Self::GeneratingPhases => 3,
            Self::ExpandingPhase => 4,
            Self::Finalizing => 5,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Extracting => "extracting",
            Self::Reviewing => "reviewing",
            Self::Questioning => "questioning",
            Self::GeneratingPhases => "generating_phases",
            Self::ExpandingPhase => "expanding_phase",
            Self::Finalizing => "finalizing",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Extracting => "Extracting Information",
            Self::Reviewing => "Reviewing Details",
            Self::Questioning => "Gathering Context",
            Self::GeneratingPhases => "Generating Phases",
            Self::ExpandingPhase => "Expanding Tasks",
            Self::Finalizing => "Finalizing Plan",
        }
    }

    pub fn is_final(self) -> bool {
        self == Self::Finalizing
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// A coarse status update emitted while a project moves through analysis and
/// plan generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEvent {
    #[serde(rename = "type")]
    pub stage: ProgressStage,
    pub message: String,
    /// 1-based phase number, set on `expanding_phase`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<u32>,
    /// Total phase count, set on `generating_phases` and `expanding_phase`.
    #[serde(
        rename = "totalPhases",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub total_phases: Option<u32>,
    pub timestamp: Timestamp,
}

impl ProgressEvent {
    pub fn new(stage: ProgressStage, message: impl Into<String>) -> Self {
        Self {
            stage,
            message: message.into(),
            phase: None,
            total_phases: None,
            timestamp: chrono::Utc::now(),
        }
    }

    pub fn with_total_phases(mut self, total: u32) -> Self {
        self.total_phases = Some(total);
        self
    }

    pub fn with_phase(mut self, phase: u32, total: u32) -> Self {
        self.phase = Some(phase);
        self.total_phases = Some(total);
        self
    }
}

// ---------------------------------------------------------------------------
// Tracker
// ---------------------------------------------------------------------------

/// Message shown before the first event arrives.
pub const IDLE_MESSAGE: &str = "Starting analysis...";

/// Ordered log of accepted progress events for one project run.
///
/// Stages never regress: an event whose stage sits earlier in [`STAGES`] than
/// the current stage is rejected and not recorded.
#[derive(Debug, Clone, Default)]
pub struct ProgressTracker {
    events: Vec<ProgressEvent>,
    current_phase: u32,
    total_phases: u32,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `event` to the log.
    pub fn record(&mut self, event: ProgressEvent) -> Result<(), CoreError> {
        if let Some(current) = self.current_stage() {
            if event.stage < current {
                return Err(CoreError::Conflict(format!(
                    "Progress cannot move back from {} to {}",
                    current.as_str(),
                    event.stage.as_str()
                )));
            }
        }

        match event.stage {
            ProgressStage::GeneratingPhases => {
                self.total_phases = event.total_phases.unwrap_or(0);
            }
            ProgressStage::ExpandingPhase => {
                self.current_phase = event.phase.unwrap_or(0);
                if let Some(total) = event.total_phases {
                    self.total_phases = total;
                }
            }
            _ => {}
        }

        self.events.push(event);
        Ok(())
    }

    pub fn events(&self) -> &[ProgressEvent] {
        &self.events
    }

    pub fn last(&self) -> Option<&ProgressEvent> {
        self.events.last()
    }

    pub fn current_stage(&self) -> Option<ProgressStage> {
        self.last().map(|e| e.stage)
    }

    pub fn current_phase(&self) -> u32 {
        self.current_phase
    }

    pub fn total_phases(&self) -> u32 {
        self.total_phases
    }

    /// Message of the latest event, or [`IDLE_MESSAGE`].
    pub fn message(&self) -> &str {
        self.last().map_or(IDLE_MESSAGE, |e| e.message.as_str())
    }

    /// Completion percentage derived from the latest stage.
    ///
    /// Non-final stages map to `position / 6 * 100`. The final stage is
    /// interpolated from the phase counters: `min(95, 80 + current / total * 15)`,
    /// or 90 when no phase total is known.
    pub fn percent(&self) -> f64 {
        let Some(stage) = self.current_stage() else {
            return 0.0;
        };

        if stage.is_final() {
            if self.total_phases > 0 {
                let ratio = self.current_phase as f64 / self.total_phases as f64;
                return (80.0 + ratio * 15.0).min(95.0);
            }
            return 90.0;
        }

        stage.position() as f64 / STAGES.len() as f64 * 100.0
    }

    pub fn is_finished(&self) -> bool {
        self.current_stage().is_some_and(ProgressStage::is_final)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn empty_tracker_is_idle() {
        let tracker = ProgressTracker::new();
        assert_eq!(tracker.percent(), 0.0);
        assert_eq!(tracker.message(), IDLE_MESSAGE);
        assert!(tracker.current_stage().is_none());
        assert!(!tracker.is_finished());
    }

    #[test]
    fn percent_follows_stage_position() {
        let mut tracker = ProgressTracker::new();
        tracker
            .record(ProgressEvent::new(ProgressStage::Questioning, "asking"))
            .unwrap();
        assert!((tracker.percent() - 2.0 / 6.0 * 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn final_stage_interpolates_from_phases() {
        let mut tracker = ProgressTracker::new();
        tracker
            .record(ProgressEvent::new(ProgressStage::GeneratingPhases, "outline").with_total_phases(4))
            .unwrap();
        tracker
            .record(ProgressEvent::new(ProgressStage::ExpandingPhase, "phase 2").with_phase(2, 4))
            .unwrap();
        tracker
            .record(ProgressEvent::new(ProgressStage::Finalizing, "done"))
            .unwrap();

        assert_eq!(tracker.total_phases(), 4);
        assert_eq!(tracker.current_phase(), 2);
        assert!((tracker.percent() - 87.5).abs() < 1e-9);
        assert!(tracker.is_finished());
    }

    #[test]
    fn final_stage_without_phases_reports_ninety() {
        let mut tracker = ProgressTracker::new();
        tracker
            .record(ProgressEvent::new(ProgressStage::Finalizing, "done"))
            .unwrap();
        assert_eq!(tracker.percent(), 90.0);
    }

    #[test]
    fn final_stage_is_capped_at_ninety_five() {
        let mut tracker = ProgressTracker::new();
        tracker
            .record(ProgressEvent::new(ProgressStage::ExpandingPhase, "all").with_phase(3, 3))
            .unwrap();
        tracker
            .record(ProgressEvent::new(ProgressStage::Finalizing, "done"))
            .unwrap();
        assert_eq!(tracker.percent(), 95.0);
    }

    #[test]
    fn regression_is_rejected_and_not_recorded() {
        let mut tracker = ProgressTracker::new();
        tracker
            .record(ProgressEvent::new(ProgressStage::ExpandingPhase, "phase 1").with_phase(1, 2))
            .unwrap();

        let result = tracker.record(ProgressEvent::new(ProgressStage::Reviewing, "late"));
        assert_matches!(result, Err(CoreError::Conflict(_)));
        assert_eq!(tracker.events().len(), 1);
        assert_eq!(tracker.current_stage(), Some(ProgressStage::ExpandingPhase));
    }

    #[test]
    fn repeated_stage_is_accepted() {
        let mut tracker = ProgressTracker::new();
        for phase in 1..=3 {
            tracker
                .record(ProgressEvent::new(ProgressStage::ExpandingPhase, "expanding").with_phase(phase, 3))
                .unwrap();
        }
        assert_eq!(tracker.events().len(), 3);
        assert_eq!(tracker.current_phase(), 3);
    }

    #[test]
    fn event_uses_wire_field_names() {
        let event = ProgressEvent::new(ProgressStage::GeneratingPhases, "outline").with_total_phases(5);
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "generating_phases");
        assert_eq!(json["totalPhases"], 5);
        assert!(json.get("phase").is_none());
    }
}
