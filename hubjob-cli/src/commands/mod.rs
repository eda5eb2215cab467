//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod device;
mod job;

pub use device::DeviceCommands;
pub use job::JobCommands;

use anyhow::Result;
use clap::Subcommand;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Job scheduling and tracking
    Job {
        #[command(subcommand)]
        command: JobCommands,
    },
    /// Device-side observations
    Device {
        #[command(subcommand)]
        command: DeviceCommands,
    },
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Job { command } => job::handle_job_command(command, config).await,
        Commands::Device { command } => device::handle_device_command(command, config).await,
    }
}
