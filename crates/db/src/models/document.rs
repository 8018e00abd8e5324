//! Uploaded document registry.

use blueprint_core::types::{EntityId, Timestamp};
use serde::{Deserialize, Serialize};

/// A document registered when its upload was signed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: EntityId,
    pub project_id: EntityId,
    pub filename: String,
    pub content_type: String,
    pub storage_key: String,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone)]
pub struct CreateDocument {
    pub project_id: EntityId,
    pub filename: String,
    pub content_type: String,
    pub storage_key: String,
}
