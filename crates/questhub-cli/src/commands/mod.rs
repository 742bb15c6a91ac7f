//! CLI command definitions and dispatch.

pub mod admin;
pub mod assignment;
pub mod config;
pub mod migrate;
pub mod partner;
pub mod serve;
pub mod user;

use clap::{Parser, Subcommand};

use questhub_api::AppState;
use questhub_core::config::AppConfig;
use questhub_core::error::AppError;
use questhub_database::DatabasePool;

use crate::output::OutputFormat;

/// QuestHub marketplace administration
#[derive(Debug, Parser)]
#[command(name = "questhub", version, about, long_about = None)]
pub struct Cli {
    /// Directory holding default.toml and the environment overlays
    #[arg(short, long, default_value = "config")]
    pub config_dir: String,

    /// Environment overlay to load (falls back to QUESTHUB_ENV, then "development")
    #[arg(short, long)]
    pub env: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the QuestHub server
    Serve(serve::ServeArgs),
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// Admin account management
    Admin(admin::AdminArgs),
    /// User management
    User(user::UserArgs),
    /// Partner listings
    Partner(partner::PartnerArgs),
    /// Shop request assignment
    Assignment(assignment::AssignmentArgs),
    /// Configuration inspection
    Config(config::ConfigArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        match &self.command {
            Commands::Serve(args) => serve::execute(args, self).await,
            Commands::Migrate(args) => migrate::execute(args, self).await,
            Commands::Admin(args) => admin::execute(args, self).await,
            Commands::User(args) => user::execute(args, self).await,
            Commands::Partner(args) => partner::execute(args, self).await,
            Commands::Assignment(args) => assignment::execute(args, self).await,
            Commands::Config(args) => config::execute(args, self).await,
        }
    }

    /// The environment overlay name.
    pub fn environment(&self) -> String {
        self.env
            .clone()
            .or_else(|| std::env::var("QUESTHUB_ENV").ok())
            .unwrap_or_else(|| "development".to_string())
    }

    /// Load and validate configuration.
    pub fn load_config(&self) -> Result<AppConfig, AppError> {
        AppConfig::load_from(&self.config_dir, &self.environment())
    }
}

/// Helper: connect to the configured database
pub async fn connect_db(config: &AppConfig) -> Result<DatabasePool, AppError> {
    DatabasePool::connect(&config.database).await
}

/// Helper: wire the full service graph, as the server does
pub async fn build_state(cli: &Cli) -> Result<AppState, AppError> {
    let config = cli.load_config()?;
    let db = connect_db(&config).await?;
    AppState::build(config, db).await
}
