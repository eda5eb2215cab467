//! Job command handlers
//!
//! Handles submitting jobs, reading their status, waiting for them to
//! finish and cancelling them.

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::*;
use hubjob_core::domain::job::{JobHandle, JobPayload, JobRequest, JobStatus};
use hubjob_tracker::{CancelSignal, JobTracker, TrackerError, cancel_pair};
use std::time::Duration;

use crate::config::Config;

/// Job subcommands
#[derive(Subcommand)]
pub enum JobCommands {
    /// Submit a job to a device
    Submit {
        /// Target device ID
        target: String,

        #[command(subcommand)]
        operation: Operation,

        /// Job ID to use instead of a generated one
        #[arg(long, global = true)]
        job_id: Option<String>,

        /// Wait until the job reaches a terminal status
        #[arg(long, global = true)]
        wait: bool,

        #[command(flatten)]
        timing: Timing,
    },
    /// Show the current status of a job
    Status {
        /// Job ID
        id: String,
    },
    /// Wait for an already submitted job to finish
    Wait {
        /// Job ID
        id: String,

        #[command(flatten)]
        timing: Timing,
    },
    /// Ask the hub to cancel a job
    Cancel {
        /// Job ID
        id: String,

        /// Reason recorded by the hub
        #[arg(long)]
        reason: Option<String>,
    },
}

/// Device operation carried by a submitted job
#[derive(Subcommand, Debug, PartialEq)]
pub enum Operation {
    /// Write a property value (parsed as JSON, or taken as a string)
    Write { property: String, value: String },
    /// Read a property into the device twin
    Read { property: String },
    /// Reboot the device
    Reboot,
    /// Reset the device to factory settings
    FactoryReset,
    /// Install a firmware package
    Firmware {
        package_uri: String,

        #[arg(long)]
        version: Option<String>,
    },
}

impl Operation {
    fn into_payload(self) -> JobPayload {
        match self {
            Operation::Write { property, value } => JobPayload::WriteProperty {
                property,
                value: serde_json::from_str(&value).unwrap_or(serde_json::Value::String(value)),
            },
            Operation::Read { property } => JobPayload::ReadProperty { property },
            Operation::Reboot => JobPayload::Reboot,
            Operation::FactoryReset => JobPayload::FactoryReset,
            Operation::Firmware {
                package_uri,
                version,
            } => JobPayload::FirmwareUpdate {
                package_uri,
                version,
            },
        }
    }
}

/// Polling cadence and deadline for waiting commands
#[derive(clap::Args, Debug)]
pub struct Timing {
    /// Seconds between status queries
    #[arg(long, env = "HUBJOB_POLL_INTERVAL", default_value_t = 2)]
    poll_interval: u64,

    /// Seconds to wait for a terminal status
    #[arg(long, env = "HUBJOB_DEADLINE", default_value_t = 180)]
    deadline: u64,
}

impl Timing {
    fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval)
    }

    fn deadline(&self) -> Duration {
        Duration::from_secs(self.deadline)
    }
}

/// Handle job commands
pub async fn handle_job_command(command: JobCommands, config: &Config) -> Result<()> {
    match command {
        JobCommands::Submit {
            target,
            operation,
            job_id,
            wait,
            timing,
        } => {
            let payload = operation.into_payload();
            let request = match job_id {
                Some(id) => JobRequest::with_id(id, target, payload),
                None => JobRequest::new(target, payload),
            };

            if wait {
                submit_and_wait(config, &request, &timing).await
            } else {
                submit_job(config, &request).await
            }
        }
        JobCommands::Status { id } => show_status(config, &id).await,
        JobCommands::Wait { id, timing } => wait_for_job(config, &id, &timing).await,
        JobCommands::Cancel { id, reason } => cancel_job(config, &id, reason).await,
    }
}

/// Submit a job without waiting
async fn submit_job(config: &Config, request: &JobRequest) -> Result<()> {
    let client = config.client()?;
    let handle = client
        .submit_job(request)
        .await
        .with_context(|| format!("Failed to submit job {}", request.job_id()))?;

    println!(
        "{} {} job submitted to {}",
        "✓".green(),
        request.payload().operation_name(),
        request.target_id().cyan()
    );
    print_handle(&handle);

    Ok(())
}

/// Submit a job and follow it to a terminal status
async fn submit_and_wait(config: &Config, request: &JobRequest, timing: &Timing) -> Result<()> {
    let tracker = tracker(config, timing)?;

    println!(
        "{} {} for {} (job {})",
        "▸".cyan(),
        request.payload().operation_name(),
        request.target_id().cyan(),
        request.job_id().dimmed()
    );

    let result = tracker
        .await_job_completion(
            request,
            timing.poll_interval(),
            timing.deadline(),
            cancel_on_ctrl_c(),
        )
        .await;

    report(result)
}

/// Show the current status of a job
async fn show_status(config: &Config, id: &str) -> Result<()> {
    let client = config.client()?;
    let handle = client
        .get_job(id)
        .await
        .with_context(|| format!("Failed to get job {}", id))?;

    print_handle(&handle);

    Ok(())
}

/// Follow an existing job to a terminal status
async fn wait_for_job(config: &Config, id: &str, timing: &Timing) -> Result<()> {
    let client = config.client()?;
    let handle = client
        .get_job(id)
        .await
        .with_context(|| format!("Failed to get job {}", id))?;

    let tracker = tracker(config, timing)?;
    let result = tracker
        .poll_until_terminal(
            handle,
            timing.poll_interval(),
            timing.deadline(),
            cancel_on_ctrl_c(),
        )
        .await;

    report(result)
}

/// Cancel a job on the hub
async fn cancel_job(config: &Config, id: &str, reason: Option<String>) -> Result<()> {
    let client = config.client()?;
    client
        .cancel_job(id, reason)
        .await
        .with_context(|| format!("Failed to cancel job {}", id))?;

    println!("{} Cancellation requested for job {}", "✓".green(), id.cyan());

    Ok(())
}

fn tracker(config: &Config, timing: &Timing) -> Result<JobTracker> {
    let tracker_config = config.tracker_config(timing.poll_interval(), timing.deadline());
    tracker_config.validate()?;

    Ok(JobTracker::from_config(tracker_config)?)
}

/// A cancel signal fired by Ctrl-C
fn cancel_on_ctrl_c() -> CancelSignal {
    let (handle, signal) = cancel_pair();

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            handle.cancel();
        }
    });

    signal
}

/// Print the tracking outcome and turn failures into an error exit
fn report(result: Result<JobHandle, TrackerError>) -> Result<()> {
    match result {
        Ok(handle) => {
            println!("{} Job {} completed", "✓".green(), handle.job_id.cyan());
            print_handle(&handle);
            Ok(())
        }
        Err(e) => {
            println!("{} {}", "✗".red(), e.to_string().red());
            if let Some(elapsed) = e.elapsed() {
                println!("    Waited:   {}s", elapsed.as_secs());
            }
            Err(e.into())
        }
    }
}

/// Print a job handle
fn print_handle(handle: &JobHandle) {
    println!("  {} Job {}", "▸".cyan(), handle.job_id.dimmed());
    println!("    Status:   {}", colorize_status(&handle.status));
    println!(
        "    Updated:  {}",
        handle
            .updated_at
            .format("%Y-%m-%d %H:%M:%S")
            .to_string()
            .dimmed()
    );
}

/// Colorize job status for display
fn colorize_status(status: &JobStatus) -> colored::ColoredString {
    let status_str = status.to_string();
    match status {
        JobStatus::Created => status_str.yellow(),
        JobStatus::Running => status_str.cyan(),
        JobStatus::Completed => status_str.green(),
        JobStatus::Failed => status_str.red(),
        JobStatus::Cancelled => status_str.dimmed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_write_value_parsed_as_json() {
        let op = Operation::Write {
            property: "temperature".to_string(),
            value: "21.5".to_string(),
        };
        assert_eq!(
            op.into_payload(),
            JobPayload::WriteProperty {
                property: "temperature".to_string(),
                value: json!(21.5),
            }
        );
    }

    #[test]
    fn test_write_value_falls_back_to_string() {
        let op = Operation::Write {
            property: "mode".to_string(),
            value: "eco".to_string(),
        };
        assert_eq!(
            op.into_payload(),
            JobPayload::WriteProperty {
                property: "mode".to_string(),
                value: json!("eco"),
            }
        );
    }

    #[test]
    fn test_firmware_payload() {
        let op = Operation::Firmware {
            package_uri: "https://fw.example.com/2.1.bin".to_string(),
            version: Some("2.1".to_string()),
        };
        assert_eq!(op.into_payload().operation_name(), "firmware_update");
    }
}
