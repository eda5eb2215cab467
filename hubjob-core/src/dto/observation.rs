//! Observation DTOs for hub communication

use serde::{Deserialize, Serialize};

/// Query parameters for listing a device's observations
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObservationQuery {
    /// Only return events whose key starts with this prefix
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
}
