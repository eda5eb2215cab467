//! Scheduler layer
//!
//! Drives tracked jobs from submission to a terminal status. Each tracked
//! job is an independent future, so callers can follow many jobs at once.

pub mod tracker;

pub use tracker::JobTracker;
