//! Device observation log
//!
//! Thread-safe, append-only record of the events devices report back
//! (notifications, acknowledged writes, executed commands). Callers confirm
//! that a device reacted to a job by looking events up by key or key prefix,
//! or by waiting for a key to appear.

use chrono::{DateTime, Utc};
use hubjob_client::ClientError;
use hubjob_core::domain::observation::ObservedEvent;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use tokio::sync::watch;
use tracing::debug;

use crate::cancel::CancelSignal;
use crate::error::ObservationError;
use crate::repository::ObservationSource;

/// Append-only observation log
///
/// Cloning is cheap and every clone sees the same events.
#[derive(Clone)]
pub struct ObservationLog {
    inner: Arc<Inner>,
}

struct Inner {
    events: RwLock<Vec<ObservedEvent>>,
    /// Bumped on every append to wake waiters
    version: watch::Sender<u64>,
}

impl ObservationLog {
    pub fn new() -> Self {
        let (version, _) = watch::channel(0);
        Self {
            inner: Arc::new(Inner {
                events: RwLock::new(Vec::new()),
                version,
            }),
        }
    }

    /// Appends an event and wakes any waiter
    pub fn record(&self, event: ObservedEvent) {
        debug!("Observed {} from {}", event.key, event.target_id);
        self.inner
            .events
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
        self.inner.version.send_modify(|v| *v += 1);
    }

    /// Most recent event recorded under exactly `key`
    pub fn latest(&self, key: &str) -> Option<ObservedEvent> {
        self.latest_after(key, None)
    }

    fn latest_after(&self, key: &str, baseline: Option<DateTime<Utc>>) -> Option<ObservedEvent> {
        self.inner
            .events
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .rev()
            .find(|event| {
                event.key == key && baseline.is_none_or(|at| event.observed_at > at)
            })
            .cloned()
    }

    /// All events whose key starts with `prefix`, oldest first
    pub fn find_by_prefix(&self, prefix: &str) -> Vec<ObservedEvent> {
        self.inner
            .events
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|event| event.key.starts_with(prefix))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner
            .events
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Waits until an event with `key` has been recorded
    ///
    /// Returns immediately if one is already in the log.
    pub async fn wait_for(
        &self,
        key: &str,
        timeout: Duration,
        cancel: CancelSignal,
    ) -> Result<ObservedEvent, ObservationError> {
        self.wait_for_newer(key, None, timeout, cancel).await
    }

    /// Waits until an event with `key` observed after `baseline` has been recorded
    ///
    /// With no baseline any event with `key` matches.
    pub async fn wait_for_newer(
        &self,
        key: &str,
        baseline: Option<DateTime<Utc>>,
        timeout: Duration,
        mut cancel: CancelSignal,
    ) -> Result<ObservedEvent, ObservationError> {
        // Subscribe before looking so an append between the two is not missed
        let mut updates = self.inner.version.subscribe();

        let arrival = async {
            loop {
                if let Some(event) = self.latest_after(key, baseline) {
                    return event;
                }
                if updates.changed().await.is_err() {
                    std::future::pending::<()>().await;
                }
            }
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ObservationError::Cancelled {
                key: key.to_string(),
            }),
            event = arrival => Ok(event),
            _ = tokio::time::sleep(timeout) => Err(ObservationError::Timeout {
                key: key.to_string(),
                waited: timeout,
            }),
        }
    }

    /// Pulls events for `target_id` from `source` and appends the new ones
    ///
    /// An event is new when no event with the same key and target is
    /// recorded after its timestamp, nor one with the same timestamp and value.
    ///
    /// # Returns
    /// The number of events appended
    pub async fn sync_from(
        &self,
        source: &dyn ObservationSource,
        target_id: &str,
        prefix: Option<&str>,
    ) -> Result<usize, ClientError> {
        let fetched = source.fetch_observations(target_id, prefix).await?;

        let fresh: Vec<ObservedEvent> = {
            let events = self
                .inner
                .events
                .read()
                .unwrap_or_else(PoisonError::into_inner);

            fetched
                .into_iter()
                .filter(|candidate| {
                    !events.iter().any(|known| {
                        known.key == candidate.key
                            && known.target_id == candidate.target_id
                            && (known.observed_at > candidate.observed_at
                                || (known.observed_at == candidate.observed_at
                                    && known.value == candidate.value))
                    })
                })
                .collect()
        };

        let appended = fresh.len();
        for event in fresh {
            self.record(event);
        }

        if appended > 0 {
            debug!("Synced {} new observation(s) for {}", appended, target_id);
        }

        Ok(appended)
    }
}

impl Default for ObservationLog {
    fn default() -> Self {
        Self::new()
    }
}
