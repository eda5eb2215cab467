//! Device observation endpoints

use crate::HubClient;
use crate::error::Result;
use hubjob_core::domain::observation::ObservedEvent;
use hubjob_core::dto::observation::ObservationQuery;

impl HubClient {
    /// List the events a device has reported to the hub
    ///
    /// # Arguments
    /// * `target_id` - The device whose events to list
    /// * `prefix` - Optional key prefix, e.g. `write.` or `notify./3/0`
    ///
    /// # Returns
    /// Events ordered oldest first
    pub async fn list_observations(
        &self,
        target_id: &str,
        prefix: Option<&str>,
    ) -> Result<Vec<ObservedEvent>> {
        let url = self.endpoint(&["api", "devices", target_id, "observations"])?;
        let query = ObservationQuery {
            prefix: prefix.map(str::to_string),
        };

        let response = self.client.get(url).query(&query).send().await?;

        self.handle_response(response).await
    }
}

#[cfg(test)]
mod tests {
    use crate::HubClient;
    use mockito::{Matcher, Server};

    #[tokio::test]
    async fn test_list_observations_with_prefix() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/devices/device-1/observations")
            .match_query(Matcher::UrlEncoded("prefix".into(), "write.".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"[{"key":"write.temperature","target_id":"device-1","value":21,"observed_at":"2026-01-01T00:00:03Z"}]"#,
            )
            .create_async()
            .await;

        let client = HubClient::new(server.url());
        let events = client
            .list_observations("device-1", Some("write."))
            .await
            .unwrap();

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].key, "write.temperature");
        assert_eq!(events[0].value, serde_json::json!(21));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_list_observations_without_prefix_sends_no_query() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/api/devices/device-1/observations")
            .match_query(Matcher::Missing)
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let client = HubClient::new(server.url());
        let events = client.list_observations("device-1", None).await.unwrap();
        assert!(events.is_empty());
    }
}
