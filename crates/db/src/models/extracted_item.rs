//! Extracted requirement items.

use blueprint_core::types::{EntityId, Timestamp};
use serde::{Deserialize, Serialize};

/// A candidate requirement produced by extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedItem {
    pub id: EntityId,
    pub project_id: EntityId,
    pub label: String,
    pub value: String,
    pub confidence: f64,
    pub selected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_document_id: Option<EntityId>,
    pub created_at: Timestamp,
}
