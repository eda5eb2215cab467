//! Service layer
//!
//! In-process state shared by the code that follows jobs, currently the
//! log of device-reported observations.

mod observation_log;

pub use observation_log::ObservationLog;
