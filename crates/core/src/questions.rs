//! Follow-up question generation for the question/answer wizard.
//!
//! Questions come from a fixed bank. A topic is skipped when the user already
//! kept an extracted item that answers it, and generation stops once the
//! per-project cap is reached or the bank runs dry.

use serde::{Deserialize, Serialize};

use crate::extraction::{
    LABEL_BUDGET, LABEL_FEATURES, LABEL_TARGET_USERS, LABEL_TECH_STACK, LABEL_TIMELINE,
};

/// Default cap on questions asked per project.
pub const DEFAULT_MAX_QUESTIONS: usize = 5;

pub const TOPIC_PRIMARY_GOAL: &str = "primary_goal";
pub const TOPIC_TIMELINE: &str = "timeline";
pub const TOPIC_BUDGET: &str = "budget";
pub const TOPIC_MVP_FEATURES: &str = "mvp_features";
pub const TOPIC_TARGET_USERS: &str = "target_users";
pub const TOPIC_TECH_CONSTRAINTS: &str = "tech_constraints";
pub const TOPIC_INTEGRATIONS: &str = "integrations";
pub const TOPIC_SUCCESS_METRICS: &str = "success_metrics";

/// One entry in the question bank.
#[derive(Debug, Clone, Copy)]
pub struct QuestionTemplate {
    pub topic: &'static str,
    pub text: &'static str,
    /// Extracted item label that makes this question redundant when selected.
    pub answered_by: Option<&'static str>,
}

pub const QUESTION_BANK: &[QuestionTemplate] = &[
    QuestionTemplate {
        topic: TOPIC_PRIMARY_GOAL,
        text: "What is the primary goal of your project?",
        answered_by: None,
    },
    QuestionTemplate {
        topic: TOPIC_MVP_FEATURES,
        text: "What are the key features you want to include in your MVP?",
        answered_by: Some(LABEL_FEATURES),
    },
    QuestionTemplate {
        topic: TOPIC_TIMELINE,
        text: "What is your target timeline for completion?",
        answered_by: Some(LABEL_TIMELINE),
    },
    QuestionTemplate {
        topic: TOPIC_BUDGET,
        text: "What is your budget range for this project?",
        answered_by: Some(LABEL_BUDGET),
    },
    QuestionTemplate {
        topic: TOPIC_TARGET_USERS,
        text: "Who are the primary users of the product?",
        answered_by: Some(LABEL_TARGET_USERS),
    },
    QuestionTemplate {
        topic: TOPIC_TECH_CONSTRAINTS,
        text: "Are there any technology constraints or preferences?",
        answered_by: Some(LABEL_TECH_STACK),
    },
    QuestionTemplate {
        topic: TOPIC_INTEGRATIONS,
        text: "Which third-party systems must the product integrate with?",
        answered_by: None,
    },
    QuestionTemplate {
        topic: TOPIC_SUCCESS_METRICS,
        text: "How will you measure the success of the project?",
        answered_by: None,
    },
];

/// What the generator knows about a project when asked for the next question.
#[derive(Debug, Clone, Copy)]
pub struct QuestionContext<'a> {
    /// Labels of extracted items the user kept.
    pub selected_labels: &'a [String],
    /// Topics already asked (answered, skipped or pending).
    pub asked_topics: &'a [String],
}

/// A question ready to be stored and shown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionDraft {
    pub topic: String,
    pub text: String,
}

/// Produces the next follow-up question, or `None` when no more are needed.
pub trait QuestionGenerator: Send + Sync {
    fn next_question(&self, ctx: &QuestionContext<'_>) -> Option<QuestionDraft>;
}

/// Generator backed by [`QUESTION_BANK`].
#[derive(Debug, Clone, Copy)]
pub struct QuestionBank {
    pub max_questions: usize,
}

impl Default for QuestionBank {
    fn default() -> Self {
        Self {
            max_questions: DEFAULT_MAX_QUESTIONS,
        }
    }
}

impl QuestionGenerator for QuestionBank {
    fn next_question(&self, ctx: &QuestionContext<'_>) -> Option<QuestionDraft> {
        if ctx.asked_topics.len() >= self.max_questions {
            return None;
        }

        QUESTION_BANK
            .iter()
            .filter(|q| !ctx.asked_topics.iter().any(|t| t == q.topic))
            .find(|q| {
                q.answered_by
                    .map_or(true, |label| !ctx.selected_labels.iter().any(|l| l == label))
            })
            .map(|q| QuestionDraft {
                topic: q.topic.to_string(),
                text: q.text.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ask_all(bank: &QuestionBank, selected: &[String]) -> Vec<String> {
        let mut asked: Vec<String> = Vec::new();
        while let Some(q) = bank.next_question(&QuestionContext {
            selected_labels: selected,
            asked_topics: &asked,
        }) {
            assert!(!asked.contains(&q.topic), "topic {} asked twice", q.topic);
            asked.push(q.topic);
        }
        asked
    }

    #[test]
    fn starts_with_primary_goal() {
        let q = QuestionBank::default()
            .next_question(&QuestionContext {
                selected_labels: &[],
                asked_topics: &[],
            })
            .unwrap();
        assert_eq!(q.topic, TOPIC_PRIMARY_GOAL);
    }

    #[test]
    fn stops_at_the_cap() {
        let asked = ask_all(&QuestionBank { max_questions: 3 }, &[]);
        assert_eq!(asked.len(), 3);
    }

    #[test]
    fn skips_topics_covered_by_selected_items() {
        let selected = vec![LABEL_BUDGET.to_string(), LABEL_TIMELINE.to_string()];
        let asked = ask_all(&QuestionBank { max_questions: 20 }, &selected);
        assert!(!asked.iter().any(|t| t == TOPIC_BUDGET));
        assert!(!asked.iter().any(|t| t == TOPIC_TIMELINE));
        assert_eq!(asked.len(), QUESTION_BANK.len() - 2);
    }

    #[test]
    fn exhausted_bank_returns_none() {
        let asked = ask_all(&QuestionBank { max_questions: 100 }, &[]);
        assert_eq!(asked.len(), QUESTION_BANK.len());
    }
}
