//! Job DTOs for hub communication

use serde::{Deserialize, Serialize};

use crate::domain::job::{JobPayload, JobRequest};

/// Body of a job submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitJob {
    pub job_id: String,
    pub target_id: String,
    pub payload: JobPayload,
}

impl From<&JobRequest> for SubmitJob {
    fn from(req: &JobRequest) -> Self {
        Self {
            job_id: req.job_id().to_string(),
            target_id: req.target_id().to_string(),
            payload: req.payload().clone(),
        }
    }
}

/// Body of a job cancellation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CancelJob {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}
