//! Storage layer: entity models, repository traits and the in-memory store.

pub mod error;
pub mod fixtures;
pub mod memory;
pub mod models;
pub mod repositories;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use repositories::Repositories;

/// Check that the store answers queries.
pub async fn health_check(repos: &Repositories) -> Result<(), StoreError> {
    repos.projects.count().await.map(|_| ())
}
