//! Tracker configuration
//!
//! Defines all configurable parameters for tracking: hub connection,
//! polling cadence, deadlines and how status regressions are treated.

use std::str::FromStr;
use std::time::Duration;

/// What to do when the hub reports a status earlier than one already seen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegressionPolicy {
    /// Log a warning and keep the furthest status observed
    Ignore,
    /// Fail tracking with `TrackerError::ProtocolViolation`
    #[default]
    Reject,
}

impl FromStr for RegressionPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ignore" => Ok(RegressionPolicy::Ignore),
            "reject" => Ok(RegressionPolicy::Reject),
            other => anyhow::bail!("unknown regression policy '{}' (expected ignore or reject)", other),
        }
    }
}

/// Tracker configuration
///
/// Intervals are configurable so that slow devices (firmware updates) and
/// quick property writes can share one tracker with different defaults.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Hub base URL (e.g., "http://localhost:8080")
    pub hub_url: String,

    /// Sleep between two status queries
    pub poll_interval: Duration,

    /// Longest time to wait for a terminal status
    pub deadline: Duration,

    /// Limit for a single hub call, independent of the deadline
    pub request_timeout: Duration,

    /// Jobs tracked at once by `JobTracker::track_all`
    pub max_concurrent_jobs: usize,

    pub regression_policy: RegressionPolicy,
}

impl TrackerConfig {
    /// Creates a new configuration with defaults
    pub fn new(hub_url: String) -> Self {
        Self {
            hub_url,
            poll_interval: Duration::from_secs(2),
            deadline: Duration::from_secs(180),
            request_timeout: hubjob_client::DEFAULT_REQUEST_TIMEOUT,
            max_concurrent_jobs: 4,
            regression_policy: RegressionPolicy::default(),
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Expected environment variables:
    /// - HUBJOB_HUB_URL (required)
    /// - HUBJOB_POLL_INTERVAL (optional, seconds, default: 2)
    /// - HUBJOB_DEADLINE (optional, seconds, default: 180)
    /// - HUBJOB_REQUEST_TIMEOUT (optional, seconds, default: 10)
    /// - HUBJOB_MAX_CONCURRENT_JOBS (optional, default: 4)
    /// - HUBJOB_REGRESSION_POLICY (optional, ignore|reject, default: reject)
    pub fn from_env() -> anyhow::Result<Self> {
        let hub_url = std::env::var("HUBJOB_HUB_URL")
            .map_err(|_| anyhow::anyhow!("HUBJOB_HUB_URL environment variable not set"))?;

        let defaults = Self::new(hub_url);

        let poll_interval = env_parse("HUBJOB_POLL_INTERVAL")?
            .map(Duration::from_secs)
            .unwrap_or(defaults.poll_interval);
        let deadline = env_parse("HUBJOB_DEADLINE")?
            .map(Duration::from_secs)
            .unwrap_or(defaults.deadline);
        let request_timeout = env_parse("HUBJOB_REQUEST_TIMEOUT")?
            .map(Duration::from_secs)
            .unwrap_or(defaults.request_timeout);

        let max_concurrent_jobs =
            env_parse("HUBJOB_MAX_CONCURRENT_JOBS")?.unwrap_or(defaults.max_concurrent_jobs);

        let regression_policy = match std::env::var("HUBJOB_REGRESSION_POLICY") {
            Ok(value) => value.parse()?,
            Err(_) => defaults.regression_policy,
        };

        Ok(Self {
            poll_interval,
            deadline,
            request_timeout,
            max_concurrent_jobs,
            regression_policy,
            ..defaults
        })
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn with_regression_policy(mut self, policy: RegressionPolicy) -> Self {
        self.regression_policy = policy;
        self
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.hub_url.is_empty() {
            anyhow::bail!("hub_url cannot be empty");
        }

        if !self.hub_url.starts_with("http://") && !self.hub_url.starts_with("https://") {
            anyhow::bail!("hub_url must start with http:// or https://");
        }

        if self.poll_interval.is_zero() {
            anyhow::bail!("poll_interval must be greater than 0");
        }

        if self.deadline < self.poll_interval {
            anyhow::bail!("deadline must be at least poll_interval");
        }

        if self.request_timeout.is_zero() {
            anyhow::bail!("request_timeout must be greater than 0");
        }

        if self.max_concurrent_jobs == 0 {
            anyhow::bail!("max_concurrent_jobs must be greater than 0");
        }

        Ok(())
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self::new("http://localhost:8080".to_string())
    }
}

/// Reads an optional numeric variable; a set but malformed value is an error
fn env_parse<T: FromStr>(name: &str) -> anyhow::Result<Option<T>> {
    match std::env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| anyhow::anyhow!("{} must be a non-negative integer, got '{}'", name, value)),
        Err(_) => Ok(None),
    }
}
