//! Repository for extracted requirement items.

use async_trait::async_trait;
use blueprint_core::extraction::ExtractedDraft;
use blueprint_core::types::EntityId;
use blueprint_core::workflow::WorkflowState;
use chrono::Utc;

use crate::error::StoreError;
use crate::memory::{MemoryStore, ITEM_PREFIX};
use crate::models::extracted_item::ExtractedItem;

#[async_trait]
pub trait ExtractionRepo: Send + Sync {
    /// Replace every item of a project with freshly extracted drafts.
    ///
    /// Fails with [`StoreError::Conflict`] unless the project is in
    /// `expected`.
    async fn replace_for_project(
        &self,
        project_id: &str,
        expected: WorkflowState,
        drafts: &[ExtractedDraft],
    ) -> Result<Vec<ExtractedItem>, StoreError>;

    async fn list_by_project(&self, project_id: &str) -> Result<Vec<ExtractedItem>, StoreError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<ExtractedItem>, StoreError>;

    /// Set `selected`, or flip it when `selected` is `None`.
    ///
    /// Returns `None` if the item does not exist.
    async fn set_selected(
        &self,
        id: &str,
        selected: Option<bool>,
    ) -> Result<Option<ExtractedItem>, StoreError>;

    /// Set `selected` on every item of a project, returning them all.
    async fn set_all_selected(
        &self,
        project_id: &str,
        selected: bool,
    ) -> Result<Vec<ExtractedItem>, StoreError>;
}

#[async_trait]
impl ExtractionRepo for MemoryStore {
    async fn replace_for_project(
        &self,
        project_id: &str,
        expected: WorkflowState,
        drafts: &[ExtractedDraft],
    ) -> Result<Vec<ExtractedItem>, StoreError> {
        let mut tables = self.tables.write().await;
        tables.require_status(project_id, expected)?;
        tables.items.retain(|i| i.project_id != project_id);

        let now = Utc::now();
        let mut created = Vec::with_capacity(drafts.len());
        for draft in drafts {
            let id: EntityId = tables.next_id(ITEM_PREFIX);
            let item = ExtractedItem {
                id,
                project_id: project_id.to_string(),
                label: draft.label.clone(),
                value: draft.value.clone(),
                confidence: draft.confidence,
                selected: draft.selected,
                source_document_id: draft.source_document_id.clone(),
                created_at: now,
            };
            tables.items.push(item.clone());
            created.push(item);
        }
        Ok(created)
    }

    async fn list_by_project(&self, project_id: &str) -> Result<Vec<ExtractedItem>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .items
            .iter()
            .filter(|i| i.project_id == project_id)
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<ExtractedItem>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.items.iter().find(|i| i.id == id).cloned())
    }

    async fn set_selected(
        &self,
        id: &str,
        selected: Option<bool>,
    ) -> Result<Option<ExtractedItem>, StoreError> {
        let mut tables = self.tables.write().await;
        Ok(tables.items.iter_mut().find(|i| i.id == id).map(|item| {
            item.selected = selected.unwrap_or(!item.selected);
            item.clone()
        }))
    }

    async fn set_all_selected(
        &self,
        project_id: &str,
        selected: bool,
    ) -> Result<Vec<ExtractedItem>, StoreError> {
        let mut tables = self.tables.write().await;
        Ok(tables
            .items
            .iter_mut()
            .filter(|i| i.project_id == project_id)
            .map(|item| {
                item.selected = selected;
                item.clone()
            })
            .collect())
    }
}
