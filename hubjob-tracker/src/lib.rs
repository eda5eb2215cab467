//! Hubjob Tracker
//!
//! Submits device-management jobs to the hub and follows them until they
//! reach a terminal status.
//!
//! Architecture:
//! - Configuration: settings from environment or defaults
//! - Repositories: trait seams over the hub (submission, status, observations)
//! - Scheduler: the job completion tracker and its poll loop
//! - Services: the in-memory device observation log
//!
//! Every tracked job runs as its own task. Suspension happens only while
//! sleeping between polls or waiting on the hub, and both waits race a
//! [`CancelSignal`] so a caller can stop tracking at any time.

pub mod cancel;
pub mod config;
pub mod error;
pub mod repository;
pub mod scheduler;
pub mod service;

pub use cancel::{CancelHandle, CancelSignal, cancel_pair};
pub use config::{RegressionPolicy, TrackerConfig};
pub use error::{ObservationError, TrackerError};
pub use repository::{JobStatusService, JobSubmissionService, ObservationSource};
pub use scheduler::JobTracker;
pub use service::ObservationLog;
