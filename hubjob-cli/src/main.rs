//! Hubjob CLI
//!
//! Command-line interface for scheduling device-management jobs on the hub
//! and following them to completion.

mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "hubjob")]
#[command(about = "Device job dispatch and tracking CLI", long_about = None)]
struct Cli {
    /// Hub URL
    #[arg(long, env = "HUBJOB_HUB_URL", default_value = "http://localhost:8080")]
    hub_url: String,

    /// Time limit for a single hub call, in seconds
    #[arg(long, env = "HUBJOB_REQUEST_TIMEOUT", default_value_t = 10)]
    request_timeout: u64,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hubjob=info,hubjob_tracker=info,hubjob_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = Config {
        hub_url: cli.hub_url,
        request_timeout: Duration::from_secs(cli.request_timeout),
    };

    handle_command(cli.command, &config).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_options() {
        let cli = Cli::try_parse_from([
            "hubjob",
            "--hub-url",
            "https://hub.example.com",
            "job",
            "status",
            "abc-1",
        ])
        .unwrap();
        assert_eq!(cli.hub_url, "https://hub.example.com");
        assert_eq!(cli.request_timeout, 10);
    }
}
