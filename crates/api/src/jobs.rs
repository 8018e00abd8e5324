//! Background simulation jobs and the registry that tracks them.
//!
//! At most one job of each [`JobKind`] runs per project. Every job gets a
//! child of the registry's root [`CancellationToken`], so a single project's
//! jobs can be stopped (restart, delete) and shutdown stops them all.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use blueprint_core::types::EntityId;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobKind {
    Extraction,
    PlanGeneration,
}

impl JobKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Extraction => "extraction",
            Self::PlanGeneration => "plan_generation",
        }
    }
}

struct RunningJob {
    job_id: u64,
    cancel: CancellationToken,
}

#[derive(Default)]
struct Running {
    next_job_id: u64,
    jobs: HashMap<(JobKind, EntityId), RunningJob>,
}

/// Tracks spawned jobs for cancellation and shutdown draining.
pub struct JobRegistry {
    running: Arc<Mutex<Running>>,
    tracker: TaskTracker,
    shutdown: CancellationToken,
}

impl Default for JobRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl JobRegistry {
    pub fn new() -> Self {
        Self {
            running: Default::default(),
            tracker: TaskTracker::new(),
            shutdown: CancellationToken::new(),
        }
    }

    /// Spawn `job` for `project_id` unless a job of the same kind is running.
    ///
    /// The job is dropped at its next await point once cancelled, even when
    /// it was woken at the same time. Returns
    /// `false` when a job was already running and nothing was spawned.
    pub async fn spawn<F>(&self, kind: JobKind, project_id: &str, job: F) -> bool
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let key = (kind, project_id.to_string());
        let (job_id, cancel) = {
            let mut running = self.running.lock().await;
            if running.jobs.contains_key(&key) {
                return false;
            }
            running.next_job_id += 1;
            let job_id = running.next_job_id;
            let cancel = self.shutdown.child_token();
            running.jobs.insert(
                key.clone(),
                RunningJob {
                    job_id,
                    cancel: cancel.clone(),
                },
            );
            (job_id, cancel)
        };

        let running = Arc::clone(&self.running);
        self.tracker.spawn(async move {
            tokio::select! {
                // Checked first so a cancelled job never gets another poll.
                biased;
                _ = cancel.cancelled() => {
                    tracing::info!(job = key.0.as_str(), project_id = %key.1, "Job cancelled");
                }
                _ = job => {}
            }

            let mut running = running.lock().await;
            // A newer job may already own the slot after a cancel.
            if running.jobs.get(&key).is_some_and(|j| j.job_id == job_id) {
                running.jobs.remove(&key);
            }
        });
        tracing::debug!(job = kind.as_str(), project_id, job_id, "Job spawned");
        true
    }

    /// Token cancelled when shutdown begins. Long-lived responses such as
    /// progress streams end on it.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    pub async fn is_running(&self, kind: JobKind, project_id: &str) -> bool {
        self.running
            .lock()
            .await
            .jobs
            .contains_key(&(kind, project_id.to_string()))
    }

    /// Cancel every job of a project and free their slots.
    pub async fn cancel_project(&self, project_id: &str) {
        let mut running = self.running.lock().await;
        running.jobs.retain(|(kind, id), job| {
            if id != project_id {
                return true;
            }
            job.cancel.cancel();
            tracing::debug!(job = kind.as_str(), project_id, "Cancelling job");
            false
        });
    }

    /// Cancel all jobs and wait up to `timeout` for them to finish.
    pub async fn shutdown(&self, timeout: Duration) {
        self.shutdown.cancel();
        self.tracker.close();
        if tokio::time::timeout(timeout, self.tracker.wait()).await.is_err() {
            tracing::warn!(remaining = self.tracker.len(), "Background jobs did not stop in time");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tokio::sync::Notify;

    use super::*;

    #[tokio::test]
    async fn second_job_of_same_kind_is_refused() {
        let registry = JobRegistry::new();
        let gate = CancellationToken::new();

        let waiting = gate.clone();
        assert!(
            registry
                .spawn(JobKind::Extraction, "project_1", async move {
                    waiting.cancelled().await
                })
                .await
        );
        assert!(!registry.spawn(JobKind::Extraction, "project_1", async {}).await);
        // Other kinds and projects are independent.
        assert!(registry.spawn(JobKind::PlanGeneration, "project_1", async {}).await);
        assert!(registry.spawn(JobKind::Extraction, "project_2", async {}).await);

        gate.cancel();
        registry.shutdown(Duration::from_secs(1)).await;
    }

    #[tokio::test]
    async fn finished_job_frees_its_slot() {
        let registry = JobRegistry::new();
        let runs = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&runs);
        registry
            .spawn(JobKind::Extraction, "project_1", async move {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .await;

        for _ in 0..100 {
            if !registry.is_running(JobKind::Extraction, "project_1").await {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert!(!registry.is_running(JobKind::Extraction, "project_1").await);
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn cancel_project_stops_its_jobs() {
        let registry = JobRegistry::new();
        let finished = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&finished);
        registry
            .spawn(JobKind::Extraction, "project_1", async move {
                tokio::time::sleep(Duration::from_secs(60)).await;
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .await;

        registry.cancel_project("project_1").await;
        assert!(!registry.is_running(JobKind::Extraction, "project_1").await);
        registry.shutdown(Duration::from_secs(1)).await;
        assert_eq!(finished.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn job_woken_as_it_is_cancelled_does_not_finish() {
        let finished = Arc::new(AtomicUsize::new(0));

        for _ in 0..200 {
            let registry = JobRegistry::new();
            let gate = Arc::new(Notify::new());

            let (waiting, counter) = (Arc::clone(&gate), Arc::clone(&finished));
            registry
                .spawn(JobKind::Extraction, "project_1", async move {
                    waiting.notified().await;
                    counter.fetch_add(1, Ordering::SeqCst);
                })
                .await;
            // Let the job start waiting on the gate.
            tokio::task::yield_now().await;

            gate.notify_one();
            registry.cancel_project("project_1").await;
            registry.shutdown(Duration::from_secs(1)).await;
        }

        assert_eq!(finished.load(Ordering::SeqCst), 0);
    }
}
