//! Configuration module
//!
//! Settings shared by every CLI command.

use std::time::Duration;

use hubjob_client::HubClient;
use hubjob_tracker::TrackerConfig;

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// URL of the hub
    pub hub_url: String,

    /// Limit for a single hub call
    pub request_timeout: Duration,
}

impl Config {
    /// Builds a hub client with the configured per-call timeout
    pub fn client(&self) -> anyhow::Result<HubClient> {
        Ok(HubClient::with_timeout(
            self.hub_url.clone(),
            self.request_timeout,
        )?)
    }

    /// Tracker settings for one waiting session
    pub fn tracker_config(&self, poll_interval: Duration, deadline: Duration) -> TrackerConfig {
        let mut config = TrackerConfig::new(self.hub_url.clone())
            .with_poll_interval(poll_interval)
            .with_deadline(deadline);
        config.request_timeout = self.request_timeout;
        config
    }
}
