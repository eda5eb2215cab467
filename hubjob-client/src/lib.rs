//! Hubjob HTTP Client
//!
//! A small, type-safe HTTP client for the device-management hub's job and
//! observation endpoints.
//!
//! Both the tracker and the CLI talk to the hub through this crate, so wire
//! details (paths, status codes, JSON bodies) live in one place.
//!
//! # Example
//!
//! ```no_run
//! use hubjob_client::HubClient;
//! use hubjob_core::domain::job::{JobPayload, JobRequest};
//!
//! #[tokio::main]
//! async fn main() -> hubjob_client::Result<()> {
//!     let client = HubClient::new("http://localhost:8080");
//!
//!     let request = JobRequest::new("device-1", JobPayload::Reboot);
//!     let handle = client.submit_job(&request).await?;
//!
//!     println!("Submitted job {} ({})", handle.job_id, handle.status);
//!     Ok(())
//! }
//! ```

pub mod error;
mod jobs;
mod observations;

// Re-export commonly used types
pub use error::{ClientError, Result};

use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Default per-request timeout for hub calls
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP client for the hub API
///
/// Endpoints are grouped by concern:
/// - Job lifecycle (submit, status, cancel)
/// - Device observations
#[derive(Debug, Clone)]
pub struct HubClient {
    /// Base URL of the hub (e.g., "http://localhost:8080")
    base_url: String,
    /// HTTP client instance
    client: Client,
}

impl HubClient {
    /// Create a new hub client with default HTTP settings
    ///
    /// # Example
    /// ```
    /// use hubjob_client::HubClient;
    ///
    /// let client = HubClient::new("http://localhost:8080");
    /// ```
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a new hub client whose requests are each bounded by `timeout`
    ///
    /// The per-request timeout is independent of any tracking deadline.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(base_url, client))
    }

    /// Create a new hub client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    ///
    /// # Example
    /// ```
    /// use hubjob_client::HubClient;
    /// use reqwest::Client;
    ///
    /// let client = HubClient::with_client("http://localhost:8080", Client::new());
    /// ```
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Get the base URL of the hub
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build an endpoint URL from path segments
    ///
    /// Segments are percent-encoded, so opaque ids may contain any character.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.base_url).map_err(|e| {
            ClientError::InvalidRequest(format!("Invalid base URL {}: {}", self.base_url, e))
        })?;

        url.path_segments_mut()
            .map_err(|_| {
                ClientError::InvalidRequest(format!("Base URL {} cannot have a path", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);

        Ok(url)
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Handle an API response and deserialize JSON
    ///
    /// This method checks the status code and returns an appropriate error if
    /// the request failed, or deserializes the response body if successful.
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        let body = response.text().await?;
        serde_json::from_str(&body)
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }

    /// Handle an API response that returns no content
    async fn handle_empty_response(&self, response: reqwest::Response) -> Result<()> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = HubClient::new("http://localhost:8080");
        assert_eq!(client.base_url(), "http://localhost:8080");
    }

    #[test]
    fn test_client_trims_trailing_slash() {
        let client = HubClient::new("http://localhost:8080/");
        assert_eq!(client.base_url(), "http://localhost:8080");
    }

    #[test]
    fn test_client_with_timeout() {
        let client = HubClient::with_timeout("http://localhost:8080", Duration::from_secs(3)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080");
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let client = HubClient::new("http://localhost:8080/hub/");
        let url = client.endpoint(&["api", "jobs", "job 1/a"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/hub/api/jobs/job%201%2Fa");
    }

    #[test]
    fn test_endpoint_rejects_invalid_base_url() {
        let client = HubClient::new("not a url");
        let err = client.endpoint(&["api"]).unwrap_err();
        assert!(matches!(err, ClientError::InvalidRequest(_)));
    }
}
