//! Requirement extraction from a project idea and its uploaded documents.
//!
//! [`Extractor`] is the seam where an AI provider would plug in. The bundled
//! [`HeuristicExtractor`] is deterministic: it scans the idea text with a few
//! regular expressions and keyword lists and scores each finding.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::EntityId;

/// Items at or above this confidence start out selected.
pub const SELECTION_THRESHOLD: f64 = 0.8;

/// Longest value kept for free-text items.
const MAX_VALUE_LEN: usize = 200;

pub const LABEL_REQUIREMENTS: &str = "Project Requirements";
pub const LABEL_TECH_STACK: &str = "Technology Stack";
pub const LABEL_TIMELINE: &str = "Timeline";
pub const LABEL_BUDGET: &str = "Budget";
pub const LABEL_TARGET_USERS: &str = "Target Users";
pub const LABEL_FEATURES: &str = "Key Features";
pub const LABEL_DOCUMENT: &str = "Supporting Document";

/// Known technology names, matched case-insensitively on word boundaries.
const TECH_KEYWORDS: &[&str] = &[
    "Rust", "Go", "Python", "Java", "Kotlin", "Swift", "TypeScript", "JavaScript", "React",
    "Next.js", "Vue", "Angular", "Svelte", "Node.js", "Django", "Flask", "Rails", "PostgreSQL",
    "MySQL", "SQLite", "MongoDB", "Redis", "Kafka", "GraphQL", "Docker", "Kubernetes", "AWS",
    "GCP", "Azure", "Supabase", "Firebase", "Flutter", "Material-UI", "Tailwind",
];

static TIMELINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b\d+(?:\s*(?:-|to)\s*\d+)?\s*(?:days?|weeks?|months?|years?)\b")
        .expect("timeline pattern is valid")
});

static BUDGET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\s?\d[\d,]*(?:\.\d+)?\s?[kKmM]?(?:\s*(?:-|to)\s*\$?\s?\d[\d,]*(?:\.\d+)?\s?[kKmM]?)?")
        .expect("budget pattern is valid")
});

static AUDIENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bfor\s+((?:small|medium|large|local|remote|busy|independent|[a-z]+)(?:[\s-]+[a-z]+){0,5}?)\s*(?:[.,;]|$|\s+(?:to|who|that|which|with)\b)")
        .expect("audience pattern is valid")
});

static FEATURES_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:with|including|features?|supports?)\s+([^.;]+)")
        .expect("features pattern is valid")
});

/// A document available to the extractor.
#[derive(Debug, Clone)]
pub struct DocumentRef {
    pub id: EntityId,
    pub filename: String,
}

/// Everything the extractor gets to look at.
#[derive(Debug, Clone, Copy)]
pub struct ExtractionInput<'a> {
    pub idea_text: &'a str,
    pub documents: &'a [DocumentRef],
}

/// A candidate requirement item, before it is stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedDraft {
    pub label: String,
    pub value: String,
    pub confidence: f64,
    pub selected: bool,
    pub source_document_id: Option<EntityId>,
}

impl ExtractedDraft {
    fn new(label: &str, value: impl Into<String>, confidence: f64) -> Self {
        let confidence = confidence.clamp(0.0, 1.0);
        Self {
            label: label.to_string(),
            value: value.into(),
            confidence,
            selected: confidence >= SELECTION_THRESHOLD,
            source_document_id: None,
        }
    }
}

/// Derives requirement items from project input.
pub trait Extractor: Send + Sync {
    fn extract(&self, input: &ExtractionInput<'_>) -> Vec<ExtractedDraft>;
}

/// Keyword and pattern based extractor.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeuristicExtractor;

impl Extractor for HeuristicExtractor {
    fn extract(&self, input: &ExtractionInput<'_>) -> Vec<ExtractedDraft> {
        let idea = input.idea_text.trim();
        let mut items = Vec::new();

        if let Some(summary) = first_sentence(idea) {
            items.push(ExtractedDraft::new(LABEL_REQUIREMENTS, summary, 0.95));
        }

        let stack = detect_technologies(idea);
        if !stack.is_empty() {
            let confidence = if stack.len() >= 2 { 0.88 } else { 0.7 };
            items.push(ExtractedDraft::new(LABEL_TECH_STACK, stack.join(", "), confidence));
        }

        if let Some(m) = TIMELINE_RE.find(idea) {
            items.push(ExtractedDraft::new(
                LABEL_TIMELINE,
                format!("{} development", m.as_str().trim()),
                0.75,
            ));
        }

        if let Some(m) = BUDGET_RE.find(idea) {
            items.push(ExtractedDraft::new(LABEL_BUDGET, m.as_str().trim(), 0.82));
        }

        if let Some(audience) = AUDIENCE_RE.captures(idea).and_then(|c| c.get(1)) {
            items.push(ExtractedDraft::new(
                LABEL_TARGET_USERS,
                capitalize(audience.as_str().trim()),
                0.9,
            ));
        }

        if let Some(features) = FEATURES_RE.captures(idea).and_then(|c| c.get(1)) {
            let list = split_list(features.as_str());
            if !list.is_empty() {
                items.push(ExtractedDraft::new(LABEL_FEATURES, list.join(", "), 0.7));
            }
        }

        for doc in input.documents {
            let mut item = ExtractedDraft::new(LABEL_DOCUMENT, doc.filename.clone(), 0.6);
            item.source_document_id = Some(doc.id.clone());
            items.push(item);
        }

        items
    }
}

/// Check a confidence score is within `[0, 1]`.
pub fn validate_confidence(confidence: f64) -> Result<(), CoreError> {
    if !(0.0..=1.0).contains(&confidence) {
        return Err(CoreError::Validation(format!(
            "Confidence {confidence} must be between 0 and 1"
        )));
    }
    Ok(())
}

/// Split a comma/"and" separated phrase into trimmed, non-empty parts.
pub fn split_list(text: &str) -> Vec<String> {
    text.split([',', '\n'])
        .flat_map(|part| part.split(" and "))
        .map(|part| part.trim().trim_end_matches('.').trim())
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

fn first_sentence(text: &str) -> Option<String> {
    let sentence = text
        .split_terminator(['.', '!', '?', '\n'])
        .map(str::trim)
        .find(|s| !s.is_empty())?;
    Some(truncate(sentence, MAX_VALUE_LEN))
}

fn detect_technologies(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    TECH_KEYWORDS
        .iter()
        .filter(|kw| contains_word(&lowered, &kw.to_lowercase()))
        .map(|kw| kw.to_string())
        .collect()
}

/// Whole-word containment; `.` and `-` count as part of a word.
fn contains_word(haystack: &str, needle: &str) -> bool {
    let is_word = |c: char| c.is_alphanumeric() || c == '.' || c == '-' || c == '+';
    haystack.match_indices(needle).any(|(start, _)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + needle.len()..].chars().next();
        let before_ok = before.map_or(true, |c| !is_word(c));
        // A trailing full stop ends a sentence rather than the word.
        let after_ok = after.map_or(true, |c| !is_word(c) || c == '.');
        before_ok && after_ok
    })
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max).collect();
    format!("{}...", cut.trim_end())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn extract(idea: &str) -> Vec<ExtractedDraft> {
        HeuristicExtractor.extract(&ExtractionInput {
            idea_text: idea,
            documents: &[],
        })
    }

    fn find<'a>(items: &'a [ExtractedDraft], label: &str) -> Option<&'a ExtractedDraft> {
        items.iter().find(|i| i.label == label)
    }

    #[test]
    fn extracts_all_signals_from_a_rich_idea() {
        let items = extract(
            "Build a SaaS platform for small businesses to manage projects. \
             Use Next.js, TypeScript and PostgreSQL with task boards, reporting and chat. \
             Budget is $50,000 - $100,000 over 3-6 months.",
        );

        let summary = find(&items, LABEL_REQUIREMENTS).unwrap();
        assert_eq!(summary.value, "Build a SaaS platform for small businesses to manage projects");
        assert!(summary.selected);

        let stack = find(&items, LABEL_TECH_STACK).unwrap();
        assert!(stack.value.contains("Next.js"));
        assert!(stack.value.contains("TypeScript"));
        assert!(stack.value.contains("PostgreSQL"));

        let budget = find(&items, LABEL_BUDGET).unwrap();
        assert_eq!(budget.value, "$50,000 - $100,000");

        let timeline = find(&items, LABEL_TIMELINE).unwrap();
        assert_eq!(timeline.value, "3-6 months development");
        assert!(!timeline.selected, "timeline sits below the selection threshold");

        let users = find(&items, LABEL_TARGET_USERS).unwrap();
        assert_eq!(users.value, "Small businesses");

        let features = find(&items, LABEL_FEATURES).unwrap();
        assert!(features.value.contains("task boards"));
    }

    #[test]
    fn plain_idea_yields_only_a_summary() {
        let items = extract("Build an app");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].label, LABEL_REQUIREMENTS);
        assert_eq!(items[0].value, "Build an app");
    }

    #[test]
    fn documents_become_sourced_items() {
        let docs = [DocumentRef {
            id: "document_1".into(),
            filename: "brief.pdf".into(),
        }];
        let items = HeuristicExtractor.extract(&ExtractionInput {
            idea_text: "Build an app",
            documents: &docs,
        });
        let doc_item = find(&items, LABEL_DOCUMENT).unwrap();
        assert_eq!(doc_item.value, "brief.pdf");
        assert_eq!(doc_item.source_document_id.as_deref(), Some("document_1"));
        assert!(!doc_item.selected);
    }

    #[test]
    fn every_confidence_is_in_range() {
        let items = extract("A Rust and Go service for remote teams with $20k budget in 2 weeks.");
        assert!(!items.is_empty());
        for item in &items {
            assert!(validate_confidence(item.confidence).is_ok(), "{item:?}");
        }
    }

    #[test]
    fn tech_keywords_match_whole_words_only() {
        assert!(contains_word("we like go.", "go"));
        assert!(!contains_word("let's go-kart", "go"));
        assert!(!contains_word("google maps", "go"));
    }

    #[test]
    fn out_of_range_confidence_is_rejected() {
        assert_matches!(validate_confidence(1.2), Err(CoreError::Validation(_)));
        assert_matches!(validate_confidence(-0.1), Err(CoreError::Validation(_)));
    }

    #[test]
    fn split_list_handles_commas_and_and() {
        assert_eq!(
            split_list("login, dashboards and exports."),
            vec!["login", "dashboards", "exports"]
        );
    }
}
