//! Error types for job tracking

use hubjob_client::ClientError;
use hubjob_core::domain::job::JobStatus;
use std::time::Duration;
use thiserror::Error;

/// Ways a tracking session can end without a Completed job
///
/// Every variant tied to a job names it together with the last status seen
/// and the time spent waiting.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// Poll interval or deadline were unusable; nothing was submitted
    #[error("Invalid tracking arguments: {0}")]
    InvalidArguments(String),

    /// The hub did not accept the job. Never retried.
    #[error("Job {job_id}: submission failed: {source}")]
    Submission {
        job_id: String,
        #[source]
        source: ClientError,
    },

    /// No terminal status before the deadline
    #[error(
        "Job {job_id}: no terminal status after {elapsed:?} (last status: {last_status}){}",
        query_suffix(.last_query_error)
    )]
    Timeout {
        job_id: String,
        last_status: JobStatus,
        elapsed: Duration,
        last_query_error: Option<String>,
    },

    /// The job ended Failed or Cancelled on the hub
    #[error("Job {job_id}: finished with status {status} after {elapsed:?}")]
    JobOutcome {
        job_id: String,
        status: JobStatus,
        elapsed: Duration,
    },

    /// The caller stopped tracking
    #[error(
        "Job {job_id}: tracking cancelled after {elapsed:?} (last status: {})",
        status_or_unknown(.last_status)
    )]
    Cancelled {
        job_id: String,
        last_status: Option<JobStatus>,
        elapsed: Duration,
    },

    /// The hub reported a status earlier than one already observed
    #[error("Job {job_id}: status went back from {previous} to {observed} after {elapsed:?}")]
    ProtocolViolation {
        job_id: String,
        previous: JobStatus,
        observed: JobStatus,
        elapsed: Duration,
    },

    /// A concurrent tracking task panicked or was aborted
    #[error("Job {job_id}: tracking task failed: {message}")]
    TaskFailed { job_id: String, message: String },
}

fn status_or_unknown(status: &Option<JobStatus>) -> String {
    status.map_or_else(|| "unknown".to_string(), |s| s.to_string())
}

fn query_suffix(error: &Option<String>) -> String {
    error
        .as_ref()
        .map(|e| format!(", last query error: {}", e))
        .unwrap_or_default()
}

impl TrackerError {
    /// The job this error is about, if any
    pub fn job_id(&self) -> Option<&str> {
        match self {
            TrackerError::InvalidArguments(_) => None,
            TrackerError::Submission { job_id, .. }
            | TrackerError::Timeout { job_id, .. }
            | TrackerError::JobOutcome { job_id, .. }
            | TrackerError::Cancelled { job_id, .. }
            | TrackerError::ProtocolViolation { job_id, .. }
            | TrackerError::TaskFailed { job_id, .. } => Some(job_id),
        }
    }

    /// The last status observed before the error
    pub fn last_status(&self) -> Option<JobStatus> {
        match self {
            TrackerError::Timeout { last_status, .. } => Some(*last_status),
            TrackerError::JobOutcome { status, .. } => Some(*status),
            TrackerError::Cancelled { last_status, .. } => *last_status,
            TrackerError::ProtocolViolation { observed, .. } => Some(*observed),
            _ => None,
        }
    }

    /// Time spent tracking before the error
    pub fn elapsed(&self) -> Option<Duration> {
        match self {
            TrackerError::Timeout { elapsed, .. }
            | TrackerError::JobOutcome { elapsed, .. }
            | TrackerError::Cancelled { elapsed, .. }
            | TrackerError::ProtocolViolation { elapsed, .. } => Some(*elapsed),
            _ => None,
        }
    }

    /// True when tracking stopped because the caller asked it to
    pub fn is_cancelled(&self) -> bool {
        matches!(self, TrackerError::Cancelled { .. })
    }
}

/// Errors from waiting on the observation log
#[derive(Debug, Error)]
pub enum ObservationError {
    #[error("No observation for {key} within {waited:?}")]
    Timeout { key: String, waited: Duration },

    #[error("Stopped waiting for observation {key}")]
    Cancelled { key: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_report_names_job_status_and_elapsed() {
        let err = TrackerError::Timeout {
            job_id: "abc-1".to_string(),
            last_status: JobStatus::Running,
            elapsed: Duration::from_secs(180),
            last_query_error: None,
        };
        assert_eq!(
            err.to_string(),
            "Job abc-1: no terminal status after 180s (last status: Running)"
        );
        assert_eq!(err.job_id(), Some("abc-1"));
        assert_eq!(err.last_status(), Some(JobStatus::Running));
        assert_eq!(err.elapsed(), Some(Duration::from_secs(180)));
    }

    #[test]
    fn test_timeout_report_includes_last_query_error() {
        let err = TrackerError::Timeout {
            job_id: "abc-1".to_string(),
            last_status: JobStatus::Created,
            elapsed: Duration::from_secs(10),
            last_query_error: Some("connection refused".to_string()),
        };
        assert!(err.to_string().ends_with(", last query error: connection refused"));
    }

    #[test]
    fn test_cancelled_before_any_status() {
        let err = TrackerError::Cancelled {
            job_id: "abc-1".to_string(),
            last_status: None,
            elapsed: Duration::ZERO,
        };
        assert!(err.is_cancelled());
        assert!(err.to_string().contains("last status: unknown"));
        assert_eq!(err.last_status(), None);
    }
}
