//! QuestHub server entry point.
//!
//! Loads configuration, sets up logging and hands over to the API crate,
//! which wires the database, cache, storage, services and worker.

use tracing_subscriber::{EnvFilter, fmt};

use questhub_core::config::AppConfig;

#[tokio::main]
async fn main() {
    let env = std::env::var("QUESTHUB_ENV").unwrap_or_else(|_| "development".to_string());
    let config_dir = std::env::var("QUESTHUB_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

    let config = match AppConfig::load_from(&config_dir, &env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = %env,
        "QuestHub starting"
    );

    if let Err(e) = questhub_api::launch(config).await {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }

    tracing::info!("QuestHub shut down gracefully");
}

/// Initialize tracing. `RUST_LOG` overrides `logging.level`.
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}
