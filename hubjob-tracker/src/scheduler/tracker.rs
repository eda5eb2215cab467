//! Job completion tracker
//!
//! Submits a job, then polls the hub until the job reaches a terminal
//! status, the deadline passes, or the caller cancels. Each tracked job owns
//! its handle exclusively; several jobs are tracked by running one tracker
//! future per job.

use hubjob_client::ClientError;
use hubjob_core::domain::job::{JobHandle, JobRequest, JobStatus};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::time::{self, Instant};
use tracing::{debug, error, info, warn};

use crate::cancel::CancelSignal;
use crate::config::{RegressionPolicy, TrackerConfig};
use crate::error::TrackerError;
use crate::repository::{JobStatusService, JobSubmissionService};
use hubjob_client::HubClient;

/// Tracks submitted jobs to completion
#[derive(Clone)]
pub struct JobTracker {
    config: TrackerConfig,
    submitter: Arc<dyn JobSubmissionService>,
    status: Arc<dyn JobStatusService>,
}

impl JobTracker {
    /// Creates a tracker over the given services
    pub fn new(
        config: TrackerConfig,
        submitter: Arc<dyn JobSubmissionService>,
        status: Arc<dyn JobStatusService>,
    ) -> Self {
        Self {
            config,
            submitter,
            status,
        }
    }

    /// Creates a tracker talking to the hub at `config.hub_url`
    pub fn from_config(config: TrackerConfig) -> hubjob_client::Result<Self> {
        let client = Arc::new(HubClient::with_timeout(
            config.hub_url.clone(),
            config.request_timeout,
        )?);
        Ok(Self::new(config, client.clone(), client))
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Submits `request` and waits for the job to finish
    ///
    /// Returns the final handle when the job completes. Submission failures
    /// are reported at once and never retried; status query failures are
    /// retried on the next tick until the deadline.
    pub async fn await_job_completion(
        &self,
        request: &JobRequest,
        poll_interval: Duration,
        deadline: Duration,
        mut cancel: CancelSignal,
    ) -> Result<JobHandle, TrackerError> {
        validate_timing(poll_interval, deadline)?;

        let job_id = request.job_id().to_string();
        let started = Instant::now();

        info!(
            "Submitting {} job {} for {}",
            request.payload().operation_name(),
            job_id,
            request.target_id()
        );

        let submitted = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                return Err(cancelled(&job_id, None, started));
            }
            result = time::timeout(self.config.request_timeout, self.submitter.submit(request)) => {
                result.unwrap_or(Err(ClientError::TimedOut(self.config.request_timeout)))
            }
        };

        let handle = submitted.map_err(|source| {
            error!("Submission of job {} failed: {}", job_id, source);
            TrackerError::Submission {
                job_id: job_id.clone(),
                source,
            }
        })?;

        debug!("Job {} accepted with status {}", job_id, handle.status);

        self.poll_loop(job_id, handle, started, poll_interval, deadline, cancel)
            .await
    }

    /// Waits for an already submitted job to finish
    ///
    /// `handle` is treated as the first observation. The deadline starts now.
    pub async fn poll_until_terminal(
        &self,
        handle: JobHandle,
        poll_interval: Duration,
        deadline: Duration,
        cancel: CancelSignal,
    ) -> Result<JobHandle, TrackerError> {
        validate_timing(poll_interval, deadline)?;

        let job_id = handle.job_id.clone();
        self.poll_loop(job_id, handle, Instant::now(), poll_interval, deadline, cancel)
            .await
    }

    /// Tracks several jobs concurrently with the configured interval and deadline
    ///
    /// Each job runs in its own task; at most `max_concurrent_jobs` are
    /// tracked at once. Results come back in the order of `requests`.
    pub async fn track_all(
        &self,
        requests: Vec<JobRequest>,
        cancel: CancelSignal,
    ) -> Vec<(String, Result<JobHandle, TrackerError>)> {
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent_jobs));
        let poll_interval = self.config.poll_interval;
        let deadline = self.config.deadline;

        let mut tasks = Vec::with_capacity(requests.len());

        for request in requests {
            let job_id = request.job_id().to_string();
            let tracker = self.clone();
            let semaphore = Arc::clone(&semaphore);
            let mut cancel = cancel.clone();

            let task = tokio::spawn(async move {
                let job_id = request.job_id().to_string();

                // Permit is released when the task finishes
                let _permit = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {
                        return Err(TrackerError::Cancelled {
                            job_id,
                            last_status: None,
                            elapsed: Duration::ZERO,
                        });
                    }
                    permit = semaphore.acquire_owned() => {
                        permit.map_err(|e| TrackerError::TaskFailed {
                            job_id: job_id.clone(),
                            message: e.to_string(),
                        })?
                    }
                };

                tracker
                    .await_job_completion(&request, poll_interval, deadline, cancel)
                    .await
            });

            tasks.push((job_id, task));
        }

        let mut results = Vec::with_capacity(tasks.len());

        for (job_id, task) in tasks {
            let result = match task.await {
                Ok(result) => result,
                Err(e) => {
                    warn!("Tracking task for job {} panicked: {}", job_id, e);
                    Err(TrackerError::TaskFailed {
                        job_id: job_id.clone(),
                        message: e.to_string(),
                    })
                }
            };
            results.push((job_id, result));
        }

        results
    }

    async fn poll_loop(
        &self,
        job_id: String,
        mut current: JobHandle,
        started: Instant,
        poll_interval: Duration,
        deadline: Duration,
        mut cancel: CancelSignal,
    ) -> Result<JobHandle, TrackerError> {
        let deadline_at = started + deadline;
        let mut last_query_error: Option<String> = None;
        let mut polls: u32 = 0;

        while !current.status.is_terminal() {
            let now = Instant::now();
            if now >= deadline_at {
                warn!(
                    "Job {} still {} after {} poll(s), giving up",
                    job_id, current.status, polls
                );
                return Err(TrackerError::Timeout {
                    job_id,
                    last_status: current.status,
                    elapsed: started.elapsed(),
                    last_query_error,
                });
            }

            // The last sleep is clamped so the deadline check lands on time
            let wake_at = (now + poll_interval).min(deadline_at);

            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    return Err(cancelled(&job_id, Some(current.status), started));
                }
                _ = time::sleep_until(wake_at) => {}
            }

            polls += 1;
            debug!("Polling job {} (attempt {})", job_id, polls);

            // A query may not outlive the deadline by more than one interval
            let budget = self
                .config
                .request_timeout
                .min((deadline_at + poll_interval).saturating_duration_since(Instant::now()));

            let queried = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    return Err(cancelled(&job_id, Some(current.status), started));
                }
                result = time::timeout(budget, self.status.get_status(&job_id)) => {
                    result.unwrap_or(Err(ClientError::TimedOut(budget)))
                }
            };

            match queried {
                Ok(snapshot) => {
                    last_query_error = None;
                    current = self.observe(&job_id, current, snapshot, started)?;
                }
                Err(e) => {
                    warn!("Status query for job {} failed, retrying: {}", job_id, e);
                    last_query_error = Some(e.to_string());
                }
            }
        }

        finish(job_id, current, started)
    }

    /// Applies a fresh snapshot, enforcing forward-only progression
    fn observe(
        &self,
        job_id: &str,
        previous: JobHandle,
        snapshot: JobHandle,
        started: Instant,
    ) -> Result<JobHandle, TrackerError> {
        if snapshot.status < previous.status {
            return match self.config.regression_policy {
                RegressionPolicy::Reject => {
                    error!(
                        "Job {} went back from {} to {}",
                        job_id, previous.status, snapshot.status
                    );
                    Err(TrackerError::ProtocolViolation {
                        job_id: job_id.to_string(),
                        previous: previous.status,
                        observed: snapshot.status,
                        elapsed: started.elapsed(),
                    })
                }
                RegressionPolicy::Ignore => {
                    warn!(
                        "Ignoring stale status {} for job {} (already {})",
                        snapshot.status, job_id, previous.status
                    );
                    Ok(previous)
                }
            };
        }

        if snapshot.status != previous.status {
            info!(
                "Job {} moved from {} to {}",
                job_id, previous.status, snapshot.status
            );
        }

        Ok(snapshot)
    }
}

fn validate_timing(poll_interval: Duration, deadline: Duration) -> Result<(), TrackerError> {
    if poll_interval.is_zero() {
        return Err(TrackerError::InvalidArguments(
            "poll interval must be greater than 0".to_string(),
        ));
    }

    if deadline < poll_interval {
        return Err(TrackerError::InvalidArguments(format!(
            "deadline {:?} must be at least the poll interval {:?}",
            deadline, poll_interval
        )));
    }

    Ok(())
}

fn cancelled(job_id: &str, last_status: Option<JobStatus>, started: Instant) -> TrackerError {
    info!("Stopped tracking job {} on request", job_id);
    TrackerError::Cancelled {
        job_id: job_id.to_string(),
        last_status,
        elapsed: started.elapsed(),
    }
}

/// Maps a terminal handle to the tracking outcome
fn finish(job_id: String, handle: JobHandle, started: Instant) -> Result<JobHandle, TrackerError> {
    let elapsed = started.elapsed();

    match handle.status {
        JobStatus::Completed => {
            info!("Job {} completed after {:?}", job_id, elapsed);
            Ok(handle)
        }
        status => {
            error!("Job {} ended {} after {:?}", job_id, status, elapsed);
            Err(TrackerError::JobOutcome {
                job_id,
                status,
                elapsed,
            })
        }
    }
}
