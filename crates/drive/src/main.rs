// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use clap::{Parser, Subcommand};
use tracing::error;

use connected_drive::config::DriveConfig;
use connected_drive::Service;

#[derive(Debug, Parser)]
#[command(name = "connected-drive", about = "Vehicle state and remote services")]
struct Cli {
    #[command(flatten)]
    config: DriveConfig,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Fetch and print the state of every vehicle on the account.
    Vehicles,
    /// Trigger a remote service on one vehicle.
    Remote {
        vin: String,
        /// Service wire name, e.g. `door-lock` or `stop-charging`.
        service: String,
    },
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let service = match cli.command {
        Command::Remote { ref service, .. } => Some(service.parse::<Service>()?),
        Command::Vehicles => None,
    };

    let account = connected_drive::connect(&cli.config).await?;
    account.get_vehicles().await?;

    match (cli.command, service) {
        (Command::Remote { vin, .. }, Some(service)) => {
            let status = account.remote_services(vin).trigger(service).await?;
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        _ => {
            println!("{}", serde_json::to_string_pretty(&account.vehicles().await)?);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    if cli.config.log_json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    if let Err(e) = run(cli).await {
        error!("fatal: {e:#}");
        std::process::exit(1);
    }
}
