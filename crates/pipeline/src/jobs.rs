//! In-memory store for background generation jobs.
//!
//! Jobs live only in process memory and are lost on restart. A job moves
//! `queued → running → completed | failed`; finished jobs are dropped by
//! [`JobStore::purge_finished`] once they are old enough.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use covergen_core::generation::CoverBatch;
use covergen_core::types::Timestamp;
use serde::Serialize;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::PipelineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_finished(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// Snapshot of a background job.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationJob {
    pub id: Uuid,
    /// Storage owner namespace of the submitter.
    pub owner: String,
    pub status: JobStatus,
    pub platforms: Vec<String>,
    pub batch: Option<CoverBatch>,
    /// Client-safe failure message.
    pub error: Option<String>,
    pub created_at: Timestamp,
    pub started_at: Option<Timestamp>,
    pub finished_at: Option<Timestamp>,
}

#[derive(Default)]
pub struct JobStore {
    jobs: RwLock<HashMap<Uuid, GenerationJob>>,
}

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a job and run `work` on a spawned task.
    ///
    /// `work` receives the job id, which callers use as the batch id so
    /// stored objects and the job share one identifier.
    pub async fn submit<F, Fut>(
        self: &Arc<Self>,
        owner: String,
        platforms: Vec<String>,
        work: F,
    ) -> GenerationJob
    where
        F: FnOnce(Uuid) -> Fut + Send + 'static,
        Fut: Future<Output = Result<CoverBatch, PipelineError>> + Send + 'static,
    {
        let job = GenerationJob {
            id: Uuid::new_v4(),
            owner,
            status: JobStatus::Queued,
            platforms,
            batch: None,
            error: None,
            created_at: Utc::now(),
            started_at: None,
            finished_at: None,
        };
        self.jobs.write().await.insert(job.id, job.clone());
        tracing::info!(job_id = %job.id, owner = %job.owner, "Generation job queued");

        let store = Arc::clone(self);
        let id = job.id;
        tokio::spawn(async move {
            store
                .update(id, |j| {
                    j.status = JobStatus::Running;
                    j.started_at = Some(Utc::now());
                })
                .await;

            let outcome = work(id).await;

            store
                .update(id, |j| {
                    j.finished_at = Some(Utc::now());
                    match outcome {
                        Ok(batch) => {
                            j.status = JobStatus::Completed;
                            j.batch = Some(batch);
                        }
                        Err(err) => {
                            tracing::warn!(job_id = %id, error = %err, "Generation job failed");
                            j.status = JobStatus::Failed;
                            j.error = Some(err.public_message());
                        }
                    }
                })
                .await;
            tracing::info!(job_id = %id, "Generation job finished");
        });

        job
    }

    pub async fn get(&self, id: Uuid) -> Option<GenerationJob> {
        self.jobs.read().await.get(&id).cloned()
    }

    /// Jobs submitted by `owner`, newest first.
    pub async fn list_for_owner(&self, owner: &str) -> Vec<GenerationJob> {
        let mut jobs: Vec<GenerationJob> = self
            .jobs
            .read()
            .await
            .values()
            .filter(|j| j.owner == owner)
            .cloned()
            .collect();
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        jobs
    }

    /// Drop finished jobs that ended more than `older_than` ago.
    pub async fn purge_finished(&self, older_than: Duration) -> usize {
        let cutoff = Utc::now()
            - chrono::Duration::from_std(older_than).unwrap_or(chrono::Duration::zero());
        let mut jobs = self.jobs.write().await;
        let before = jobs.len();
        jobs.retain(|_, j| !(j.status.is_finished() && j.finished_at.is_some_and(|t| t <= cutoff)));
        before - jobs.len()
    }

    pub async fn len(&self) -> usize {
        self.jobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    async fn update(&self, id: Uuid, f: impl FnOnce(&mut GenerationJob)) {
        if let Some(job) = self.jobs.write().await.get_mut(&id) {
            f(job);
        }
    }
}
