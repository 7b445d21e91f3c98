//! Core-exposed service facade.
//!
//! Everything outside the core (HTTP surface, scheduler) talks to the system
//! through this type, so the periodic and on-demand paths share the same
//! claim semantics and cannot race onto the same job.

use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use crate::error::Result;
use crate::jobs::{Job, JobStore};
use crate::runner::RunController;

/// Queue counts for the status endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct StatusSummary {
    pub pending_count: usize,
    pub completed_count: usize,
}

/// Facade over the store and the run controller.
pub struct BriefService {
    store: Arc<JobStore>,
    controller: Arc<RunController>,
}

impl BriefService {
    pub fn new(store: Arc<JobStore>, controller: Arc<RunController>) -> Self {
        Self { store, controller }
    }

    /// Submit a keyword; returns the new job's id.
    pub async fn submit(&self, keyword: &str) -> Result<Uuid> {
        Ok(self.store.insert(keyword).await?)
    }

    /// Fetch a job by id.
    pub async fn get(&self, id: Uuid) -> Option<Job> {
        self.store.get(id).await
    }

    /// Fetch the most recent job for a keyword.
    pub async fn get_by_keyword(&self, keyword: &str) -> Option<Job> {
        self.store.get_by_keyword(keyword).await
    }

    /// Claim one pending job and execute it to a terminal outcome.
    ///
    /// Returns the executed job's id (whether its run completed or failed),
    /// or `None` when nothing was pending.
    pub async fn claim_and_run(&self) -> Result<Option<Uuid>> {
        let Some((id, keyword)) = self.store.claim().await else {
            return Ok(None);
        };
        self.controller.execute(id, &keyword).await?;
        Ok(Some(id))
    }

    /// Pending and completed counts.
    pub async fn status_summary(&self) -> StatusSummary {
        let (pending_count, completed_count) = self.store.counts().await;
        StatusSummary {
            pending_count,
            completed_count,
        }
    }
}
