//! Data Transfer Objects for hub communication
//!
//! Request bodies and query parameters exchanged with the hub's job and
//! observation endpoints.

pub mod job;
pub mod observation;
