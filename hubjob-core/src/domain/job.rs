//! Job domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A device-management job addressed to one target device
///
/// The job id is generated by the caller and must be unique per submission.
/// A request is immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRequest {
    job_id: String,
    target_id: String,
    payload: JobPayload,
}

impl JobRequest {
    /// Creates a request with a freshly generated job id
    pub fn new(target_id: impl Into<String>, payload: JobPayload) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), target_id, payload)
    }

    /// Creates a request with a caller-supplied job id
    pub fn with_id(
        job_id: impl Into<String>,
        target_id: impl Into<String>,
        payload: JobPayload,
    ) -> Self {
        Self {
            job_id: job_id.into(),
            target_id: target_id.into(),
            payload,
        }
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    pub fn target_id(&self) -> &str {
        &self.target_id
    }

    pub fn payload(&self) -> &JobPayload {
        &self.payload
    }
}

/// Operation carried by a job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JobPayload {
    /// Write a value to a device property
    WriteProperty {
        property: String,
        value: serde_json::Value,
    },

    /// Read a device property back into the device twin
    ReadProperty { property: String },

    Reboot,

    FactoryReset,

    /// Download and apply a firmware package
    FirmwareUpdate {
        package_uri: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        version: Option<String>,
    },
}

impl JobPayload {
    /// Short operation name used in logs and CLI output
    pub fn operation_name(&self) -> &'static str {
        match self {
            JobPayload::WriteProperty { .. } => "write_property",
            JobPayload::ReadProperty { .. } => "read_property",
            JobPayload::Reboot => "reboot",
            JobPayload::FactoryReset => "factory_reset",
            JobPayload::FirmwareUpdate { .. } => "firmware_update",
        }
    }
}

/// Job execution status
///
/// Variants are declared in execution order. A job only ever moves forward
/// through this ordering; once a terminal status is reached it never changes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum JobStatus {
    Created,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl JobStatus {
    /// Returns true for Completed, Failed and Cancelled
    pub fn is_terminal(&self) -> bool {
        *self >= JobStatus::Completed
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Created => write!(f, "Created"),
            JobStatus::Running => write!(f, "Running"),
            JobStatus::Completed => write!(f, "Completed"),
            JobStatus::Failed => write!(f, "Failed"),
            JobStatus::Cancelled => write!(f, "Cancelled"),
        }
    }
}

/// Snapshot of a submitted job as reported by the hub
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobHandle {
    pub job_id: String,
    pub status: JobStatus,
    pub updated_at: DateTime<Utc>,
}

impl JobHandle {
    /// Creates a snapshot stamped with the current time
    pub fn new(job_id: impl Into<String>, status: JobStatus) -> Self {
        Self {
            job_id: job_id.into(),
            status,
            updated_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_ordering_follows_progress() {
        assert!(JobStatus::Created < JobStatus::Running);
        assert!(JobStatus::Running < JobStatus::Completed);
        assert!(JobStatus::Completed < JobStatus::Failed);
        assert!(JobStatus::Failed < JobStatus::Cancelled);
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(!JobStatus::Created.is_terminal());
        assert!(!JobStatus::Running.is_terminal());
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
        assert!(JobStatus::Cancelled.is_terminal());
    }

    #[test]
    fn test_generated_job_ids_are_unique() {
        let a = JobRequest::new("device-1", JobPayload::Reboot);
        let b = JobRequest::new("device-1", JobPayload::Reboot);
        assert_ne!(a.job_id(), b.job_id());
        assert_eq!(a.target_id(), "device-1");
    }

    #[test]
    fn test_payload_is_tagged_by_type() {
        let payload = JobPayload::WriteProperty {
            property: "temperature".to_string(),
            value: serde_json::json!(21.5),
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["type"], "write_property");
        assert_eq!(json["property"], "temperature");

        let parsed: JobPayload =
            serde_json::from_str(r#"{"type":"firmware_update","package_uri":"https://fw/1.bin"}"#)
                .unwrap();
        assert_eq!(
            parsed,
            JobPayload::FirmwareUpdate {
                package_uri: "https://fw/1.bin".to_string(),
                version: None,
            }
        );
        assert_eq!(parsed.operation_name(), "firmware_update");
    }
}
