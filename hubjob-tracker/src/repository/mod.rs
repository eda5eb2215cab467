//! Repository layer
//!
//! Trait seams over the hub. The tracker only ever talks to these traits,
//! so tests can drive it with in-memory fakes while production code plugs in
//! [`HubClient`](hubjob_client::HubClient).

mod jobs;
mod observations;

// Re-export traits
pub use jobs::{JobStatusService, JobSubmissionService};
pub use observations::ObservationSource;
