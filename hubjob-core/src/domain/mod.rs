//! Core domain types
//!
//! These types describe device-management jobs and device-reported
//! observations. They are shared between the HTTP client (wire format)
//! and the tracker (polling logic).

pub mod job;
pub mod observation;
