//! Start the QuestHub server.

use clap::Args;

use questhub_core::error::AppError;

use super::Cli;

/// Arguments for the serve command
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Override the server port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Override the server host
    #[arg(long)]
    pub host: Option<String>,

    /// Skip migrations on startup regardless of configuration
    #[arg(long)]
    pub no_migrate: bool,

    /// Do not start the background worker in this process
    #[arg(long)]
    pub no_worker: bool,
}

/// Execute the serve command
pub async fn execute(args: &ServeArgs, cli: &Cli) -> Result<(), AppError> {
    let mut config = cli.load_config()?;

    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(ref host) = args.host {
        config.server.host = host.clone();
    }
    if args.no_migrate {
        config.database.run_migrations = false;
    }
    if args.no_worker {
        config.worker.enabled = false;
    }

    println!("Starting QuestHub server...");
    println!("  Environment: {}", cli.environment());
    println!("  Address: {}:{}", config.server.host, config.server.port);

    questhub_api::launch(config).await
}
