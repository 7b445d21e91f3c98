//! In-memory job store.
//!
//! One `RwLock` over the whole table makes every operation atomic; the write
//! lock taken by `claim` is the sole serialization point the concurrency model
//! requires. Nothing holds the lock across an await on external work.

use std::collections::VecDeque;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use super::model::{Job, JobStatus};
use crate::error::StoreError;

/// In-memory table of jobs, ordered by submission.
pub struct JobStore {
    jobs: RwLock<VecDeque<Job>>,
}

impl JobStore {
    /// Create a new empty store.
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            jobs: RwLock::new(VecDeque::new()),
        })
    }

    /// Insert a new pending job.
    ///
    /// Duplicate keywords are allowed by design: each submission is its own
    /// job with its own id, never deduplicated against earlier ones.
    pub async fn insert(&self, keyword: &str) -> Result<Uuid, StoreError> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Err(StoreError::Validation("keyword must not be empty".into()));
        }

        let job = Job::new(keyword);
        let id = job.id;

        let mut jobs = self.jobs.write().await;
        jobs.push_back(job);

        info!(job_id = %id, keyword = %keyword, "Job submitted");
        Ok(id)
    }

    /// Atomically claim the oldest unowned pending job.
    ///
    /// Sets the owner token and transitions to in_progress under one write
    /// lock, so no two callers can claim the same job. Returns `None` when
    /// nothing is pending.
    pub async fn claim(&self) -> Option<(Uuid, String)> {
        let mut jobs = self.jobs.write().await;

        let job = jobs.iter_mut().find(|j| j.is_claimable())?;
        job.owner_token = Some(Uuid::new_v4());
        job.status = JobStatus::InProgress;

        debug!(job_id = %job.id, keyword = %job.keyword, "Job claimed");
        Some((job.id, job.keyword.clone()))
    }

    /// Record a finished brief for an in-progress job.
    pub async fn complete(&self, id: Uuid, result: &str) -> Result<(), StoreError> {
        if result.is_empty() {
            return Err(StoreError::Validation("result must not be empty".into()));
        }

        let mut jobs = self.jobs.write().await;
        let job = find_mut(&mut jobs, id)?;
        check_transition(job, JobStatus::Completed, "complete")?;

        job.status = JobStatus::Completed;
        job.result = Some(result.to_string());
        job.completed_at = Some(Utc::now());

        info!(job_id = %id, chars = result.len(), "Job completed");
        Ok(())
    }

    /// Record a failure reason for an in-progress job.
    pub async fn fail(&self, id: Uuid, reason: &str) -> Result<(), StoreError> {
        let mut jobs = self.jobs.write().await;
        let job = find_mut(&mut jobs, id)?;
        check_transition(job, JobStatus::Failed, "fail")?;

        job.status = JobStatus::Failed;
        job.failure_reason = Some(reason.to_string());
        job.completed_at = Some(Utc::now());

        info!(job_id = %id, reason = %reason, "Job failed");
        Ok(())
    }

    /// Get a job by id. Never mutates.
    pub async fn get(&self, id: Uuid) -> Option<Job> {
        self.jobs.read().await.iter().find(|j| j.id == id).cloned()
    }

    /// Get the most recently submitted job for a keyword. Never mutates.
    pub async fn get_by_keyword(&self, keyword: &str) -> Option<Job> {
        self.jobs
            .read()
            .await
            .iter()
            .rev()
            .find(|j| j.keyword == keyword)
            .cloned()
    }

    /// All pending jobs, oldest first.
    pub async fn list_pending(&self) -> Vec<Job> {
        self.list_by_status(JobStatus::Pending).await
    }

    /// All completed jobs, oldest first.
    pub async fn list_completed(&self) -> Vec<Job> {
        self.list_by_status(JobStatus::Completed).await
    }

    /// Pending and completed counts for the status summary.
    pub async fn counts(&self) -> (usize, usize) {
        let jobs = self.jobs.read().await;
        let pending = jobs.iter().filter(|j| j.status == JobStatus::Pending).count();
        let completed = jobs
            .iter()
            .filter(|j| j.status == JobStatus::Completed)
            .count();
        (pending, completed)
    }

    /// Total number of jobs in the store (all statuses).
    pub async fn len(&self) -> usize {
        self.jobs.read().await.len()
    }

    /// Check if the store is empty.
    pub async fn is_empty(&self) -> bool {
        self.jobs.read().await.is_empty()
    }

    async fn list_by_status(&self, status: JobStatus) -> Vec<Job> {
        self.jobs
            .read()
            .await
            .iter()
            .filter(|j| j.status == status)
            .cloned()
            .collect()
    }
}

fn find_mut(jobs: &mut VecDeque<Job>, id: Uuid) -> Result<&mut Job, StoreError> {
    jobs.iter_mut()
        .find(|j| j.id == id)
        .ok_or_else(|| StoreError::NotFound(id.to_string()))
}

fn check_transition(job: &Job, target: JobStatus, action: &str) -> Result<(), StoreError> {
    if !job.status.can_transition_to(target) {
        return Err(StoreError::InvalidState {
            id: job.id,
            status: job.status.to_string(),
            action: action.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn insert_and_get() {
        let store = JobStore::new();
        let id = store.insert("running shoes").await.unwrap();

        let job = store.get(id).await.unwrap();
        assert_eq!(job.keyword, "running shoes");
        assert_eq!(job.status, JobStatus::Pending);
    }

    #[tokio::test]
    async fn insert_rejects_empty_keyword() {
        let store = JobStore::new();
        assert!(matches!(
            store.insert("").await,
            Err(StoreError::Validation(_))
        ));
        assert!(matches!(
            store.insert("   ").await,
            Err(StoreError::Validation(_))
        ));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn duplicate_keywords_get_distinct_ids() {
        let store = JobStore::new();
        let first = store.insert("seo tools").await.unwrap();
        let second = store.insert("seo tools").await.unwrap();

        assert_ne!(first, second);
        assert_eq!(store.list_pending().await.len(), 2);
    }

    #[tokio::test]
    async fn claim_takes_oldest_pending() {
        let store = JobStore::new();
        let first = store.insert("first").await.unwrap();
        let second = store.insert("second").await.unwrap();

        let (claimed, keyword) = store.claim().await.unwrap();
        assert_eq!(claimed, first);
        assert_eq!(keyword, "first");

        let (claimed, _) = store.claim().await.unwrap();
        assert_eq!(claimed, second);

        assert!(store.claim().await.is_none());
    }

    #[tokio::test]
    async fn claimed_job_is_owned_and_in_progress() {
        let store = JobStore::new();
        let id = store.insert("kw").await.unwrap();
        store.claim().await.unwrap();

        let job = store.get(id).await.unwrap();
        assert_eq!(job.status, JobStatus::InProgress);
        assert!(job.owner_token.is_some());
        assert!(!job.is_claimable());
    }

    #[tokio::test]
    async fn concurrent_claims_each_job_exactly_once() {
        let store = JobStore::new();
        for i in 0..50 {
            store.insert(&format!("kw-{i}")).await.unwrap();
        }

        let mut tasks = tokio::task::JoinSet::new();
        for _ in 0..8 {
            let store = Arc::clone(&store);
            tasks.spawn(async move {
                let mut claimed = Vec::new();
                while let Some((id, _)) = store.claim().await {
                    claimed.push(id);
                }
                claimed
            });
        }

        let mut all: Vec<Uuid> = Vec::new();
        while let Some(claimed) = tasks.join_next().await {
            all.extend(claimed.unwrap());
        }

        all.sort();
        all.dedup();
        assert_eq!(all.len(), 50, "each job claimed exactly once, never twice");
    }

    #[tokio::test]
    async fn complete_requires_in_progress() {
        let store = JobStore::new();
        let id = store.insert("kw").await.unwrap();

        // Still pending — not claimable for completion.
        assert!(matches!(
            store.complete(id, "brief").await,
            Err(StoreError::InvalidState { .. })
        ));

        store.claim().await.unwrap();
        store.complete(id, "brief").await.unwrap();

        let job = store.get(id).await.unwrap();
        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(job.result.as_deref(), Some("brief"));
        assert!(job.completed_at.is_some());
        assert!(job.failure_reason.is_none());
    }

    #[tokio::test]
    async fn complete_rejects_terminal_and_unknown() {
        let store = JobStore::new();
        let id = store.insert("kw").await.unwrap();
        store.claim().await.unwrap();
        store.complete(id, "brief").await.unwrap();

        assert!(matches!(
            store.complete(id, "again").await,
            Err(StoreError::InvalidState { .. })
        ));
        assert!(matches!(
            store.fail(id, "nope").await,
            Err(StoreError::InvalidState { .. })
        ));
        assert!(matches!(
            store.complete(Uuid::new_v4(), "brief").await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn complete_rejects_empty_result() {
        let store = JobStore::new();
        let id = store.insert("kw").await.unwrap();
        store.claim().await.unwrap();

        assert!(matches!(
            store.complete(id, "").await,
            Err(StoreError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn fail_records_reason() {
        let store = JobStore::new();
        let id = store.insert("kw").await.unwrap();
        store.claim().await.unwrap();
        store.fail(id, "engine reported run as failed").await.unwrap();

        let job = store.get(id).await.unwrap();
        assert_eq!(job.status, JobStatus::Failed);
        assert!(job.failure_reason.unwrap().contains("failed"));
        assert!(job.result.is_none());
    }

    #[tokio::test]
    async fn get_by_keyword_returns_most_recent() {
        let store = JobStore::new();
        let _older = store.insert("kw").await.unwrap();
        let newer = store.insert("kw").await.unwrap();

        let job = store.get_by_keyword("kw").await.unwrap();
        assert_eq!(job.id, newer);
        assert!(store.get_by_keyword("other").await.is_none());
    }

    #[tokio::test]
    async fn reads_are_idempotent() {
        let store = JobStore::new();
        let id = store.insert("kw").await.unwrap();
        store.claim().await.unwrap();
        store.complete(id, "the brief").await.unwrap();

        let first = store.get(id).await.unwrap();
        let second = store.get(id).await.unwrap();
        assert_eq!(first.result, second.result);
        assert_eq!(first.status, second.status);
    }

    #[tokio::test]
    async fn counts_track_partitions() {
        let store = JobStore::new();
        let a = store.insert("a").await.unwrap();
        store.insert("b").await.unwrap();
        store.insert("c").await.unwrap();

        store.claim().await.unwrap();
        store.complete(a, "done").await.unwrap();

        let (pending, completed) = store.counts().await;
        assert_eq!(pending, 2);
        assert_eq!(completed, 1);
        assert_eq!(store.list_completed().await.len(), 1);
    }
}
