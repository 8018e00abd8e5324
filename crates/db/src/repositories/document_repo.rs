//! Repository for uploaded documents.

use async_trait::async_trait;
use chrono::Utc;

use crate::error::StoreError;
use crate::memory::{MemoryStore, DOCUMENT_PREFIX};
use crate::models::document::{CreateDocument, Document};

#[async_trait]
pub trait DocumentRepo: Send + Sync {
    async fn create(&self, input: &CreateDocument) -> Result<Document, StoreError>;

    async fn list_by_project(&self, project_id: &str) -> Result<Vec<Document>, StoreError>;
}

#[async_trait]
impl DocumentRepo for MemoryStore {
    async fn create(&self, input: &CreateDocument) -> Result<Document, StoreError> {
        let mut tables = self.tables.write().await;
        if !tables.project_exists(&input.project_id) {
            return Err(StoreError::Integrity(format!(
                "Cannot register a document for missing project {}",
                input.project_id
            )));
        }
        let document = Document {
            id: tables.next_id(DOCUMENT_PREFIX),
            project_id: input.project_id.clone(),
            filename: input.filename.clone(),
            content_type: input.content_type.clone(),
            storage_key: input.storage_key.clone(),
            created_at: Utc::now(),
        };
        tables.documents.push(document.clone());
        Ok(document)
    }

    async fn list_by_project(&self, project_id: &str) -> Result<Vec<Document>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .documents
            .iter()
            .filter(|d| d.project_id == project_id)
            .cloned()
            .collect())
    }
}
