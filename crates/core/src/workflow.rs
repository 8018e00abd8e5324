//! Project lifecycle state machine.
//!
//! Every project carries a [`WorkflowState`] as its status. The state only
//! moves forward through [`transition`]; the single backward edge is
//! [`WorkflowEvent::Restart`], which returns any state to `Draft`.
//!
//! ```text
//! draft -> extracting -> reviewing -> questioning -> planning -> completed
//!   ^                                                                |
//!   +------------------------------ restart -------------------------+
//! ```
//!
//! Both the API handlers and the client orchestrator consume this module, so
//! the transition table exists in exactly one place.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// States
// ---------------------------------------------------------------------------

/// The lifecycle state of a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowState {
    Draft,
    Extracting,
    Reviewing,
    Questioning,
    Planning,
    Completed,
}

/// All states in lifecycle order.
pub const ALL_STATES: [WorkflowState; 6] = [
    WorkflowState::Draft,
    WorkflowState::Extracting,
    WorkflowState::Reviewing,
    WorkflowState::Questioning,
    WorkflowState::Planning,
    WorkflowState::Completed,
];

impl WorkflowState {
    /// Parse a state name (`"draft"`, `"extracting"`, ...).
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        ALL_STATES
            .into_iter()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid workflow state '{s}'. Must be one of: draft, extracting, \
                     reviewing, questioning, planning, completed"
                ))
            })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Extracting => "extracting",
            Self::Reviewing => "reviewing",
            Self::Questioning => "questioning",
            Self::Planning => "planning",
            Self::Completed => "completed",
        }
    }

    /// Zero-based position in the lifecycle.
    pub fn position(self) -> usize {
        match self {
            Self::Draft => 0,
            Self::Extracting => 1,
            Self::Reviewing => 2,
            Self::Questioning => 3,
            Self::Planning => 4,
            Self::Completed => 5,
        }
    }

    /// Coarse completion percentage of the lifecycle (0 at draft, 100 at completed).
    pub fn percent(self) -> f64 {
        self.position() as f64 / (ALL_STATES.len() - 1) as f64 * 100.0
    }

    pub fn is_terminal(self) -> bool {
        self == Self::Completed
    }
}

impl std::fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Something that happened to a project and may move its state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowEvent {
    /// Extraction was requested, explicitly or because results were missing.
    StartExtraction,
    /// Extraction results are available.
    ExtractionReady,
    /// The user confirmed the review screen with `selected` items kept.
    ConfirmSelection { selected: usize },
    /// Question generation signalled that no further questions are needed.
    QuestionsExhausted,
    /// The terminal `finalizing` progress event was observed.
    PlanFinalized,
    /// "Restart analysis".
    Restart,
}

impl WorkflowEvent {
    fn name(self) -> &'static str {
        match self {
            Self::StartExtraction => "start_extraction",
            Self::ExtractionReady => "extraction_ready",
            Self::ConfirmSelection { .. } => "confirm_selection",
            Self::QuestionsExhausted => "questions_exhausted",
            Self::PlanFinalized => "plan_finalized",
            Self::Restart => "restart",
        }
    }
}

// ---------------------------------------------------------------------------
// Transitions
// ---------------------------------------------------------------------------

/// Apply `event` to `state`, returning the next state.
///
/// Returns [`CoreError::Validation`] when a guard fails (confirming with no
/// selected items) and [`CoreError::Conflict`] when the event is not allowed
/// in the current state.
pub fn transition(state: WorkflowState, event: WorkflowEvent) -> Result<WorkflowState, CoreError> {
    use WorkflowEvent as E;
    use WorkflowState as S;

    match (state, event) {
        (_, E::Restart) => Ok(S::Draft),
        (S::Draft, E::StartExtraction) => Ok(S::Extracting),
        (S::Extracting, E::ExtractionReady) => Ok(S::Reviewing),
        (S::Reviewing, E::ConfirmSelection { selected }) => {
            if selected == 0 {
                return Err(CoreError::Validation(
                    "Select at least one extracted item before continuing".into(),
                ));
            }
            Ok(S::Questioning)
        }
        (S::Questioning, E::QuestionsExhausted) => Ok(S::Planning),
        (S::Planning, E::PlanFinalized) => Ok(S::Completed),
        (state, event) => Err(CoreError::Conflict(format!(
            "Cannot apply '{}' while project is {state}",
            event.name()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn happy_path_reaches_completed() {
        let path = [
            WorkflowEvent::StartExtraction,
            WorkflowEvent::ExtractionReady,
            WorkflowEvent::ConfirmSelection { selected: 1 },
            WorkflowEvent::QuestionsExhausted,
            WorkflowEvent::PlanFinalized,
        ];
        let mut state = WorkflowState::Draft;
        for event in path {
            let next = transition(state, event).unwrap();
            assert!(next.position() > state.position());
            state = next;
        }
        assert_eq!(state, WorkflowState::Completed);
        assert!(state.is_terminal());
    }

    #[test]
    fn confirm_requires_a_selected_item() {
        let result = transition(
            WorkflowState::Reviewing,
            WorkflowEvent::ConfirmSelection { selected: 0 },
        );
        assert_matches!(result, Err(CoreError::Validation(_)));
    }

    #[test]
    fn out_of_order_event_is_a_conflict() {
        let result = transition(WorkflowState::Draft, WorkflowEvent::QuestionsExhausted);
        assert_matches!(result, Err(CoreError::Conflict(msg)) if msg.contains("draft"));

        let result = transition(WorkflowState::Completed, WorkflowEvent::StartExtraction);
        assert_matches!(result, Err(CoreError::Conflict(_)));
    }

    #[test]
    fn restart_returns_to_draft_from_anywhere() {
        for state in ALL_STATES {
            assert_eq!(
                transition(state, WorkflowEvent::Restart).unwrap(),
                WorkflowState::Draft
            );
        }
    }

    #[test]
    fn parse_round_trips_names() {
        for state in ALL_STATES {
            assert_eq!(WorkflowState::parse(state.as_str()).unwrap(), state);
        }
        assert_matches!(WorkflowState::parse("created"), Err(CoreError::Validation(_)));
    }

    #[test]
    fn percent_spans_zero_to_hundred() {
        assert_eq!(WorkflowState::Draft.percent(), 0.0);
        assert_eq!(WorkflowState::Completed.percent(), 100.0);
    }

    #[test]
    fn serializes_as_snake_case() {
        let json = serde_json::to_string(&WorkflowState::Questioning).unwrap();
        assert_eq!(json, "\"questioning\"");
    }
}
