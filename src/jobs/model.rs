//! Job record and status state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Status of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Job is waiting to be claimed.
    Pending,
    /// Job is owned by a run.
    InProgress,
    /// Job finished with a result.
    Completed,
    /// Job finished with a failure reason.
    Failed,
}

impl JobStatus {
    /// Check if this status allows transitioning to another status.
    ///
    /// Transitions are monotonic: pending → in_progress → {completed, failed}.
    pub fn can_transition_to(&self, target: JobStatus) -> bool {
        use JobStatus::*;

        matches!(
            (self, target),
            (Pending, InProgress) | (InProgress, Completed) | (InProgress, Failed)
        )
    }

    /// Check if this is a terminal status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Failed => "failed",
        };
        write!(f, "{s}")
    }
}

/// A unit of work: one keyword progressing from submission to a brief.
#[derive(Debug, Clone, Serialize)]
pub struct Job {
    /// Unique job ID, immutable for the job's lifetime.
    pub id: Uuid,
    /// The keyword the brief is generated for. Never empty.
    pub keyword: String,
    /// Current status.
    pub status: JobStatus,
    /// When the job was submitted.
    pub created_at: DateTime<Utc>,
    /// When the job reached a terminal status.
    pub completed_at: Option<DateTime<Utc>>,
    /// The finished brief. Non-null iff status is completed.
    pub result: Option<String>,
    /// Why the job failed. Non-null iff status is failed.
    pub failure_reason: Option<String>,
    /// Set on claim; a job with an owner cannot be claimed again.
    #[serde(skip_serializing)]
    pub owner_token: Option<Uuid>,
}

impl Job {
    /// Create a new pending job for a keyword.
    pub fn new(keyword: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            keyword: keyword.into(),
            status: JobStatus::Pending,
            created_at: Utc::now(),
            completed_at: None,
            result: None,
            failure_reason: None,
            owner_token: None,
        }
    }

    /// Check whether this job is claimable: pending and unowned.
    pub fn is_claimable(&self) -> bool {
        self.status == JobStatus::Pending && self.owner_token.is_none()
    }
}
