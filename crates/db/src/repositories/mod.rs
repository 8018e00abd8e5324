//! Repository layer.
//!
//! Each repository is an `async_trait` interface with one implementation on
//! [`crate::memory::MemoryStore`]. Handlers only see the traits through the
//! [`Repositories`] bundle, so a different backing store can be injected
//! without touching them.

pub mod document_repo;
pub mod extraction_repo;
pub mod plan_repo;
pub mod project_repo;
pub mod question_repo;
pub mod team_repo;
pub mod user_repo;

use std::sync::Arc;

pub use document_repo::DocumentRepo;
pub use extraction_repo::ExtractionRepo;
pub use plan_repo::PlanRepo;
pub use project_repo::ProjectRepo;
pub use question_repo::QuestionRepo;
pub use team_repo::TeamRepo;
pub use user_repo::UserRepo;

use crate::memory::MemoryStore;

/// Every repository the API needs, as trait objects.
#[derive(Clone)]
pub struct Repositories {
    pub projects: Arc<dyn ProjectRepo>,
    pub extractions: Arc<dyn ExtractionRepo>,
    pub questions: Arc<dyn QuestionRepo>,
    pub plans: Arc<dyn PlanRepo>,
    pub team: Arc<dyn TeamRepo>,
    pub documents: Arc<dyn DocumentRepo>,
    pub users: Arc<dyn UserRepo>,
}

impl Repositories {
    /// All repositories backed by one fresh [`MemoryStore`].
    pub fn in_memory() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            projects: store.clone(),
            extractions: store.clone(),
            questions: store.clone(),
            plans: store.clone(),
            team: store.clone(),
            documents: store.clone(),
            users: store,
        }
    }
}
