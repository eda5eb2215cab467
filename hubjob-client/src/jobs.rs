//! Job-related API endpoints

use crate::HubClient;
use crate::error::Result;
use hubjob_core::domain::job::{JobHandle, JobRequest};
use hubjob_core::dto::job::{CancelJob, SubmitJob};
use tracing::debug;

impl HubClient {
    // =============================================================================
    // Job Lifecycle
    // =============================================================================

    /// Submit a job to the hub
    ///
    /// The job id inside `request` is caller-generated. A hub that already
    /// knows the id answers with 409, reported by
    /// [`ClientError::is_conflict`](crate::ClientError::is_conflict).
    ///
    /// # Returns
    /// The initial handle for the job
    pub async fn submit_job(&self, request: &JobRequest) -> Result<JobHandle> {
        let url = self.endpoint(&["api", "jobs"])?;
        debug!(
            "Submitting {} job {} for {}",
            request.payload().operation_name(),
            request.job_id(),
            request.target_id()
        );

        let response = self
            .client
            .post(url)
            .json(&SubmitJob::from(request))
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Get the current status of a job
    pub async fn get_job(&self, job_id: &str) -> Result<JobHandle> {
        let url = self.endpoint(&["api", "jobs", job_id])?;
        let response = self.client.get(url).send().await?;

        self.handle_response(response).await
    }

    /// Ask the hub to cancel a job
    ///
    /// # Arguments
    /// * `job_id` - The job to cancel
    /// * `reason` - Optional free-form reason recorded by the hub
    pub async fn cancel_job(&self, job_id: &str, reason: Option<String>) -> Result<()> {
        let url = self.endpoint(&["api", "jobs", job_id, "cancel"])?;
        let response = self
            .client
            .post(url)
            .json(&CancelJob { reason })
            .send()
            .await?;

        self.handle_empty_response(response).await
    }
}

#[cfg(test)]
mod tests {
    use crate::{ClientError, HubClient};
    use hubjob_core::domain::job::{JobPayload, JobRequest, JobStatus};
    use mockito::{Matcher, Server};
    use serde_json::json;

    #[tokio::test]
    async fn test_submit_job_posts_request_body() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("POST", "/api/jobs")
            .match_body(Matcher::PartialJson(json!({
                "job_id": "abc-1",
                "target_id": "device-1",
                "payload": { "type": "write_property", "property": "temperature", "value": 21 }
            })))
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"job_id":"abc-1","status":"Created","updated_at":"2026-01-01T00:00:00Z"}"#,
            )
            .create_async()
            .await;

        let client = HubClient::new(server.url());
        let request = JobRequest::with_id(
            "abc-1",
            "device-1",
            JobPayload::WriteProperty {
                property: "temperature".to_string(),
                value: json!(21),
            },
        );

        let handle = client.submit_job(&request).await.unwrap();
        assert_eq!(handle.job_id, "abc-1");
        assert_eq!(handle.status, JobStatus::Created);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_submit_duplicate_job_is_conflict() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/api/jobs")
            .with_status(409)
            .with_body("job abc-1 already exists")
            .create_async()
            .await;

        let client = HubClient::new(server.url());
        let request = JobRequest::with_id("abc-1", "device-1", JobPayload::Reboot);

        let err = client.submit_job(&request).await.unwrap_err();
        assert!(err.is_conflict());
        assert!(err.to_string().contains("already exists"));
    }

    #[tokio::test]
    async fn test_get_job_returns_status() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/api/jobs/abc-1")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"job_id":"abc-1","status":"Running","updated_at":"2026-01-01T00:00:02Z"}"#,
            )
            .create_async()
            .await;

        let client = HubClient::new(server.url());
        let handle = client.get_job("abc-1").await.unwrap();
        assert_eq!(handle.status, JobStatus::Running);
    }

    #[tokio::test]
    async fn test_get_unknown_job_is_not_found() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/api/jobs/missing")
            .with_status(404)
            .with_body("not found")
            .create_async()
            .await;

        let client = HubClient::new(server.url());
        let err = client.get_job("missing").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_get_job_with_malformed_body_is_parse_error() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/api/jobs/abc-1")
            .with_status(200)
            .with_body(r#"{"job_id":"abc-1","status":"Exploded"}"#)
            .create_async()
            .await;

        let client = HubClient::new(server.url());
        let err = client.get_job("abc-1").await.unwrap_err();
        assert!(matches!(err, ClientError::ParseError(_)));
    }

    #[tokio::test]
    async fn test_cancel_job_sends_reason() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/jobs/abc-1/cancel")
            .match_body(Matcher::Json(json!({ "reason": "operator abort" })))
            .with_status(204)
            .create_async()
            .await;

        let client = HubClient::new(server.url());
        client
            .cancel_job("abc-1", Some("operator abort".to_string()))
            .await
            .unwrap();
        mock.assert_async().await;
    }
}
