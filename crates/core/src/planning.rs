//! Plan outline generation and task dependency rules.
//!
//! [`build_outline`] turns the kept extracted items and the wizard answers into
//! an ordered list of phases with tasks. Dependencies inside an outline are
//! expressed as [`TaskRef`] positions and resolved to ids when stored.
//!
//! [`validate_dependencies`] guards manual edits: every dependency must name a
//! task of the same project, a task may not depend on itself, and the
//! dependency graph must stay acyclic.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::extraction::{split_list, LABEL_FEATURES, LABEL_TARGET_USERS, LABEL_TECH_STACK};
use crate::questions::{TOPIC_MVP_FEATURES, TOPIC_SUCCESS_METRICS, TOPIC_TARGET_USERS, TOPIC_TECH_CONSTRAINTS};
use crate::types::EntityId;

/// Most feature tasks generated for the development phase.
pub const MAX_FEATURE_TASKS: usize = 6;

/// Shortest allowed task duration.
pub const MIN_DURATION_DAYS: u32 = 1;

// ---------------------------------------------------------------------------
// Outline types
// ---------------------------------------------------------------------------

/// Position of a task inside an outline: `(phase index, task index)`, both 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskRef {
    pub phase: usize,
    pub task: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub duration_days: u32,
    pub depends_on: Vec<TaskRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseDraft {
    pub title: String,
    pub description: String,
    pub tasks: Vec<TaskDraft>,
}

/// Inputs gathered from the earlier workflow steps.
#[derive(Debug, Clone, Copy)]
pub struct PlanInputs<'a> {
    pub project_name: &'a str,
    /// `(label, value)` of every selected extracted item.
    pub selected_items: &'a [(String, String)],
    /// `(topic, answer)` of every answered question.
    pub answers: &'a [(String, String)],
}

impl PlanInputs<'_> {
    fn answer(&self, topic: &str) -> Option<&str> {
        self.answers
            .iter()
            .find(|(t, a)| t == topic && !a.trim().is_empty())
            .map(|(_, a)| a.trim())
    }

    fn item(&self, label: &str) -> Option<&str> {
        self.selected_items
            .iter()
            .find(|(l, v)| l == label && !v.trim().is_empty())
            .map(|(_, v)| v.trim())
    }

    fn answer_or_item(&self, topic: &str, label: &str) -> Option<&str> {
        self.answer(topic).or_else(|| self.item(label))
    }
}

// ---------------------------------------------------------------------------
// Outline builder
// ---------------------------------------------------------------------------

struct PhaseBuilder {
    phase: usize,
    draft: PhaseDraft,
}

impl PhaseBuilder {
    fn new(phase: usize, title: &str, description: String) -> Self {
        Self {
            phase,
            draft: PhaseDraft {
                title: title.to_string(),
                description,
                tasks: Vec::new(),
            },
        }
    }

    /// Add a task depending on `depends_on`; returns its ref.
    fn task(&mut self, title: String, description: &str, days: u32, depends_on: Vec<TaskRef>) -> TaskRef {
        self.draft.tasks.push(TaskDraft {
            title,
            description: description.to_string(),
            duration_days: days.max(MIN_DURATION_DAYS),
            depends_on,
        });
        TaskRef {
            phase: self.phase,
            task: self.draft.tasks.len() - 1,
        }
    }

    /// Tasks no other task in this phase depends on.
    fn exits(&self) -> Vec<TaskRef> {
        let depended: HashSet<TaskRef> = self
            .draft
            .tasks
            .iter()
            .flat_map(|t| t.depends_on.iter().copied())
            .filter(|r| r.phase == self.phase)
            .collect();
        (0..self.draft.tasks.len())
            .map(|task| TaskRef {
                phase: self.phase,
                task,
            })
            .filter(|r| !depended.contains(r))
            .collect()
    }
}

/// Build the phase/task outline for a project.
///
/// Tasks inside a phase run in sequence, except feature tasks in the
/// development phase, which all hang off the environment setup and run in
/// parallel. The first task of each phase depends on every exit task of the
/// previous phase.
pub fn build_outline(inputs: &PlanInputs<'_>) -> Vec<PhaseDraft> {
    let mut phases: Vec<PhaseDraft> = Vec::new();

    // Planning
    let mut planning = PhaseBuilder::new(
        0,
        "Planning Phase",
        format!("Initial planning and requirements gathering for {}", inputs.project_name),
    );
    let scope = planning.task(
        "Define project scope".into(),
        "Clearly define what the project will deliver",
        2,
        Vec::new(),
    );
    let timeline = planning.task(
        "Create project timeline".into(),
        "Develop a detailed project schedule",
        1,
        vec![scope],
    );
    if let Some(stack) = inputs.answer_or_item(TOPIC_TECH_CONSTRAINTS, LABEL_TECH_STACK) {
        planning.task(
            format!("Confirm technology stack: {stack}"),
            "Validate the chosen tools against the requirements",
            1,
            vec![timeline],
        );
    }
    let mut previous_exits = finish(&mut phases, planning);

    // Design
    let mut design = PhaseBuilder::new(1, "Design Phase", "Architecture and user experience design".into());
    let model = design.task(
        "Design data model".into(),
        "Model the core entities and their relationships",
        3,
        previous_exits.clone(),
    );
    let ux_title = match inputs.answer_or_item(TOPIC_TARGET_USERS, LABEL_TARGET_USERS) {
        Some(users) => format!("Design user experience for {}", users.to_lowercase()),
        None => "Design user experience".to_string(),
    };
    design.task(ux_title, "Wireframes and key user journeys", 4, vec![model]);
    previous_exits = finish(&mut phases, design);

    // Development
    let mut development = PhaseBuilder::new(2, "Development Phase", "Core development and implementation".into());
    let setup = development.task(
        "Set up development environment".into(),
        "Configure tools and development setup",
        2,
        previous_exits.clone(),
    );
    let features: Vec<String> = inputs
        .answer_or_item(TOPIC_MVP_FEATURES, LABEL_FEATURES)
        .map(split_list)
        .unwrap_or_default()
        .into_iter()
        .take(MAX_FEATURE_TASKS)
        .collect();
    if features.is_empty() {
        development.task(
            "Implement core features".into(),
            "Develop the main functionality",
            10,
            vec![setup],
        );
    } else {
        for feature in features {
            development.task(
                format!("Implement {feature}"),
                "Build, review and document the feature",
                5,
                vec![setup],
            );
        }
    }
    previous_exits = finish(&mut phases, development);

    // Testing
    let mut testing = PhaseBuilder::new(3, "Testing Phase", "Quality assurance and testing".into());
    let unit = testing.task(
        "Unit testing".into(),
        "Write and run unit tests",
        3,
        previous_exits.clone(),
    );
    testing.task(
        "Integration testing".into(),
        "Test component integration",
        4,
        vec![unit],
    );
    previous_exits = finish(&mut phases, testing);

    // Launch
    let mut launch = PhaseBuilder::new(4, "Launch Phase", "Release and early feedback".into());
    let deploy = launch.task(
        "Prepare deployment".into(),
        "Provision environments and release pipeline",
        2,
        previous_exits.clone(),
    );
    let go_live = launch.task(
        "Launch and gather feedback".into(),
        "Release to first users and collect feedback",
        3,
        vec![deploy],
    );
    if let Some(metrics) = inputs.answer(TOPIC_SUCCESS_METRICS) {
        launch.task(
            format!("Track success metrics: {metrics}"),
            "Instrument and review the agreed success metrics",
            1,
            vec![go_live],
        );
    }
    finish(&mut phases, launch);

    phases
}

fn finish(phases: &mut Vec<PhaseDraft>, builder: PhaseBuilder) -> Vec<TaskRef> {
    let exits = builder.exits();
    phases.push(builder.draft);
    exits
}

// ---------------------------------------------------------------------------
// Indices
// ---------------------------------------------------------------------------

/// The next free 1-based index after `existing`.
pub fn next_index(existing: impl IntoIterator<Item = i32>) -> i32 {
    existing.into_iter().max().map_or(1, |max| max + 1)
}

pub fn validate_index(idx: i32) -> Result<(), CoreError> {
    if idx < 1 {
        return Err(CoreError::Validation(format!("Index {idx} must be 1 or greater")));
    }
    Ok(())
}

pub fn validate_duration(days: u32) -> Result<(), CoreError> {
    if days < MIN_DURATION_DAYS {
        return Err(CoreError::Validation(format!(
            "Duration must be at least {MIN_DURATION_DAYS} day"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Dependencies
// ---------------------------------------------------------------------------

/// Validate the dependency list of `task_id`.
///
/// `graph` maps every task of the project to its current dependencies. The
/// entry for `task_id` itself (if present) is replaced by `depends_on` before
/// the cycle check.
pub fn validate_dependencies(
    task_id: &str,
    depends_on: &[EntityId],
    graph: &BTreeMap<EntityId, Vec<EntityId>>,
) -> Result<(), CoreError> {
    let mut seen = HashSet::new();
    for dep in depends_on {
        if dep == task_id {
            return Err(CoreError::Validation("A task cannot depend on itself".into()));
        }
        if !graph.contains_key(dep) {
            return Err(CoreError::Validation(format!(
                "Dependency '{dep}' is not a task of this project"
            )));
        }
        if !seen.insert(dep.as_str()) {
            return Err(CoreError::Validation(format!("Dependency '{dep}' is listed twice")));
        }
    }

    // With the new edges in place, a cycle exists iff task_id is reachable
    // from one of its own dependencies.
    let mut stack: Vec<&str> = depends_on.iter().map(String::as_str).collect();
    let mut visited: HashSet<&str> = HashSet::new();
    while let Some(current) = stack.pop() {
        if current == task_id {
            return Err(CoreError::Validation(
                "Dependencies would create a cycle".into(),
            ));
        }
        if !visited.insert(current) {
            continue;
        }
        if let Some(next) = graph.get(current) {
            stack.extend(next.iter().map(String::as_str));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn inputs<'a>(items: &'a [(String, String)], answers: &'a [(String, String)]) -> PlanInputs<'a> {
        PlanInputs {
            project_name: "Atlas",
            selected_items: items,
            answers,
        }
    }

    fn pair(a: &str, b: &str) -> (String, String) {
        (a.to_string(), b.to_string())
    }

    #[test]
    fn bare_outline_has_five_phases() {
        let outline = build_outline(&inputs(&[], &[]));
        let titles: Vec<&str> = outline.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(
            titles,
            ["Planning Phase", "Design Phase", "Development Phase", "Testing Phase", "Launch Phase"]
        );
        assert_eq!(outline[2].tasks[1].title, "Implement core features");
    }

    #[test]
    fn features_from_answers_become_parallel_tasks() {
        let answers = [pair(TOPIC_MVP_FEATURES, "login, dashboards and exports")];
        let outline = build_outline(&inputs(&[], &answers));
        let dev = &outline[2];
        assert_eq!(dev.tasks.len(), 4);
        for task in &dev.tasks[1..] {
            assert_eq!(task.depends_on, vec![TaskRef { phase: 2, task: 0 }]);
        }

        // Unit testing waits for every feature.
        let unit = &outline[3].tasks[0];
        assert_eq!(unit.depends_on.len(), 3);
        assert!(unit.depends_on.iter().all(|r| r.phase == 2 && r.task >= 1));
    }

    #[test]
    fn selected_items_feed_the_outline() {
        let items = [
            pair(LABEL_TECH_STACK, "Rust, PostgreSQL"),
            pair(LABEL_TARGET_USERS, "Small businesses"),
        ];
        let outline = build_outline(&inputs(&items, &[]));
        assert_eq!(outline[0].tasks[2].title, "Confirm technology stack: Rust, PostgreSQL");
        assert_eq!(outline[1].tasks[1].title, "Design user experience for small businesses");
    }

    #[test]
    fn every_outline_dependency_points_backwards() {
        let answers = [
            pair(TOPIC_MVP_FEATURES, "a, b"),
            pair(TOPIC_SUCCESS_METRICS, "weekly active users"),
        ];
        let outline = build_outline(&inputs(&[], &answers));
        for (p, phase) in outline.iter().enumerate() {
            for (t, task) in phase.tasks.iter().enumerate() {
                for dep in &task.depends_on {
                    assert!((dep.phase, dep.task) < (p, t), "{dep:?} not before ({p}, {t})");
                }
            }
        }
        assert!(outline[4].tasks.last().unwrap().title.contains("weekly active users"));
    }

    #[test]
    fn next_index_starts_at_one() {
        assert_eq!(next_index(Vec::<i32>::new()), 1);
        assert_eq!(next_index([1, 4, 2]), 5);
    }

    fn graph(edges: &[(&str, &[&str])]) -> BTreeMap<EntityId, Vec<EntityId>> {
        edges
            .iter()
            .map(|(k, deps)| (k.to_string(), deps.iter().map(|d| d.to_string()).collect()))
            .collect()
    }

    #[test]
    fn dependency_on_unknown_task_is_rejected() {
        let g = graph(&[("task_1", &[])]);
        let result = validate_dependencies("task_2", &["task_9".into()], &g);
        assert_matches!(result, Err(CoreError::Validation(msg)) if msg.contains("task_9"));
    }

    #[test]
    fn self_dependency_is_rejected() {
        let g = graph(&[("task_1", &[])]);
        assert_matches!(
            validate_dependencies("task_1", &["task_1".into()], &g),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn cycle_is_rejected() {
        // task_2 -> task_1, so task_1 -> task_2 closes a loop.
        let g = graph(&[("task_1", &[]), ("task_2", &["task_1"])]);
        assert_matches!(
            validate_dependencies("task_1", &["task_2".into()], &g),
            Err(CoreError::Validation(msg)) if msg.contains("cycle")
        );
    }

    #[test]
    fn acyclic_dependencies_pass() {
        let g = graph(&[("task_1", &[]), ("task_2", &["task_1"]), ("task_3", &[])]);
        assert!(validate_dependencies("task_3", &["task_1".into(), "task_2".into()], &g).is_ok());
    }
}
