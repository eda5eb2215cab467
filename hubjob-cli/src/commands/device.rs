//! Device command handlers
//!
//! Shows the events a device has reported back to the hub and waits for new ones.

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::*;
use hubjob_core::domain::observation::{ObservationKey, ObservedEvent};
use hubjob_tracker::{ObservationLog, cancel_pair};
use std::time::Duration;

use crate::config::Config;

/// Device subcommands
#[derive(Subcommand)]
pub enum DeviceCommands {
    /// List events reported by a device
    Observations {
        /// Target device ID
        target: String,

        /// Only show keys starting with this prefix (e.g. "write.", "notify./3/0")
        #[arg(long)]
        prefix: Option<String>,
    },
    /// Wait until a device reports an event under a key
    Await {
        /// Target device ID
        target: String,

        /// Observation key, e.g. "exec.reboot" or "write.temperature"
        key: ObservationKey,

        /// Seconds between fetches from the hub
        #[arg(long, default_value_t = 2)]
        poll_interval: u64,

        /// Seconds to wait before giving up
        #[arg(long, default_value_t = 60)]
        timeout: u64,
    },
}

/// Handle device commands
pub async fn handle_device_command(command: DeviceCommands, config: &Config) -> Result<()> {
    match command {
        DeviceCommands::Observations { target, prefix } => {
            list_observations(config, &target, prefix.as_deref()).await
        }
        DeviceCommands::Await {
            target,
            key,
            poll_interval,
            timeout,
        } => {
            await_observation(
                config,
                &target,
                &key,
                Duration::from_secs(poll_interval.max(1)),
                Duration::from_secs(timeout),
            )
            .await
        }
    }
}

/// List observations for a device
async fn list_observations(config: &Config, target: &str, prefix: Option<&str>) -> Result<()> {
    let client = config.client()?;
    let events = client
        .list_observations(target, prefix)
        .await
        .with_context(|| format!("Failed to list observations for {}", target))?;

    if events.is_empty() {
        println!("{}", "No observations found.".yellow());
    } else {
        println!(
            "{}",
            format!("Found {} observation(s) for {}:", events.len(), target).bold()
        );
        println!();
        for event in &events {
            print_event(event);
        }
    }

    Ok(())
}

/// Fetch observations until a new event under `key` shows up
///
/// Events the hub already holds form the baseline; only a later one counts.
/// A background task mirrors the hub into a local log while the foreground
/// waits on the log.
async fn await_observation(
    config: &Config,
    target: &str,
    key: &ObservationKey,
    poll_interval: Duration,
    timeout: Duration,
) -> Result<()> {
    let client = config.client()?;
    let log = ObservationLog::new();
    let key = key.to_string();

    log.sync_from(&client, target, Some(&key))
        .await
        .with_context(|| format!("Failed to fetch observations for {}", target))?;
    let baseline = log.latest(&key).map(|event| event.observed_at);

    let mirror = {
        let log = log.clone();
        let target = target.to_string();
        let prefix = key.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(poll_interval);
            loop {
                ticker.tick().await;
                if let Err(e) = log.sync_from(&client, &target, Some(&prefix)).await {
                    tracing::warn!("Failed to fetch observations for {}: {}", target, e);
                }
            }
        })
    };

    let (handle, signal) = cancel_pair();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            handle.cancel();
        }
    });

    let result = log.wait_for_newer(&key, baseline, timeout, signal).await;

    mirror.abort();
    ctrl_c.abort();

    let event = result?;
    println!("{} {} reported {}", "✓".green(), target.cyan(), key.bold());
    print_event(&event);

    Ok(())
}

/// Print a single observation
fn print_event(event: &ObservedEvent) {
    println!(
        "  {} {} = {}",
        event
            .observed_at
            .format("%Y-%m-%d %H:%M:%S")
            .to_string()
            .dimmed(),
        event.key.cyan(),
        event.value
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use hubjob_tracker::ObservationError;
    use mockito::{Matcher, Server};

    #[tokio::test]
    async fn test_await_ignores_events_reported_before_start() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/api/devices/device-1/observations")
            .match_query(Matcher::UrlEncoded("prefix".into(), "exec.reboot".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"[{"key":"exec.reboot","target_id":"device-1","value":"ok","observed_at":"2026-01-01T00:00:00Z"}]"#,
            )
            .create_async()
            .await;

        let config = Config {
            hub_url: server.url(),
            request_timeout: Duration::from_secs(5),
        };

        let err = await_observation(
            &config,
            "device-1",
            &ObservationKey::exec("reboot"),
            Duration::from_millis(200),
            Duration::from_secs(1),
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ObservationError>(),
            Some(ObservationError::Timeout { .. })
        ));
    }
}
