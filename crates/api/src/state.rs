use std::sync::Arc;

use blueprint_core::extraction::{Extractor, HeuristicExtractor};
use blueprint_core::questions::{QuestionBank, QuestionGenerator};
use blueprint_db::Repositories;
use blueprint_events::ProgressHub;

use crate::config::ServerConfig;
use crate::jobs::JobRegistry;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Repository trait objects over the backing store.
    pub repos: Repositories,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Progress fan-out with per-project replay.
    pub progress: Arc<ProgressHub>,
    /// Running background jobs.
    pub jobs: Arc<JobRegistry>,
    /// Requirement extractor used by extraction jobs.
    pub extractor: Arc<dyn Extractor>,
    /// Follow-up question source.
    pub questions: Arc<dyn QuestionGenerator>,
}

impl AppState {
    /// State with the deterministic extractor and the question bank.
    pub fn new(config: ServerConfig, repos: Repositories) -> Self {
        let questions = QuestionBank {
            max_questions: config.simulation.max_questions,
        };
        Self {
            repos,
            config: Arc::new(config),
            progress: Arc::new(ProgressHub::default()),
            jobs: Arc::new(JobRegistry::new()),
            extractor: Arc::new(HeuristicExtractor),
            questions: Arc::new(questions),
        }
    }
}
