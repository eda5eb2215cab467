//! Job submission and status seams
//!
//! - Submitting a job description and receiving its first handle
//! - Querying the current status of a submitted job

use async_trait::async_trait;
use hubjob_client::{HubClient, Result};
use hubjob_core::domain::job::{JobHandle, JobRequest};

/// Accepts job descriptions
#[async_trait]
pub trait JobSubmissionService: Send + Sync {
    /// Submits a job and returns its initial handle
    ///
    /// Submitting again with a new job id creates a second job; the service
    /// gives no idempotency guarantee.
    async fn submit(&self, request: &JobRequest) -> Result<JobHandle>;
}

/// Reports the current status of submitted jobs
#[async_trait]
pub trait JobStatusService: Send + Sync {
    /// Returns the current handle for `job_id`
    async fn get_status(&self, job_id: &str) -> Result<JobHandle>;
}

#[async_trait]
impl JobSubmissionService for HubClient {
    async fn submit(&self, request: &JobRequest) -> Result<JobHandle> {
        self.submit_job(request).await
    }
}

#[async_trait]
impl JobStatusService for HubClient {
    async fn get_status(&self, job_id: &str) -> Result<JobHandle> {
        self.get_job(job_id).await
    }
}
