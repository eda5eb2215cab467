//! Device observation seam

use async_trait::async_trait;
use hubjob_client::{HubClient, Result};
use hubjob_core::domain::observation::ObservedEvent;

/// Read-only access to the events devices have reported
#[async_trait]
pub trait ObservationSource: Send + Sync {
    /// Returns events for `target_id`, oldest first, optionally filtered by key prefix
    async fn fetch_observations(
        &self,
        target_id: &str,
        prefix: Option<&str>,
    ) -> Result<Vec<ObservedEvent>>;
}

#[async_trait]
impl ObservationSource for HubClient {
    async fn fetch_observations(
        &self,
        target_id: &str,
        prefix: Option<&str>,
    ) -> Result<Vec<ObservedEvent>> {
        self.list_observations(target_id, prefix).await
    }
}
