//! Configuration inspection commands.

use clap::{Args, Subcommand};

use questhub_core::config::AppConfig;
use questhub_core::error::AppError;

use super::Cli;
use crate::output::{self, OutputFormat};

/// Arguments for config commands
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration with secrets masked
    Show,
    /// Load and validate the configuration
    Validate,
}

/// Execute config commands
pub async fn execute(args: &ConfigArgs, cli: &Cli) -> Result<(), AppError> {
    match &args.command {
        ConfigCommand::Show => {
            let config = masked(cli.load_config()?);
            match cli.format {
                OutputFormat::Json => output::print_item(&config, &[], cli.format),
                OutputFormat::Table => print_summary(&config),
            }
        }
        ConfigCommand::Validate => match cli.load_config() {
            Ok(config) => {
                output::print_success(&format!(
                    "Configuration for '{}' is valid",
                    cli.environment()
                ));
                print_summary(&masked(config));
            }
            Err(e) => {
                output::print_error(&format!("Configuration invalid: {e}"));
                return Err(e);
            }
        },
    }

    Ok(())
}

fn print_summary(config: &AppConfig) {
    output::print_kv(
        "Server",
        &format!("{}:{}", config.server.host, config.server.port),
    );
    output::print_kv("Database", &config.database.url);
    output::print_kv("Cache", &config.cache.provider);
    output::print_kv("Storage", &config.storage.provider);
    output::print_kv("Facebook login", &config.facebook.enabled.to_string());
    output::print_kv("Worker", &config.worker.enabled.to_string());
    output::print_kv("Log level", &config.logging.level);
}

/// Replace credentials with a placeholder before display.
fn masked(mut config: AppConfig) -> AppConfig {
    config.database.url = mask_password(&config.database.url);
    config.cache.redis.url = mask_password(&config.cache.redis.url);
    for secret in [
        &mut config.auth.jwt_secret,
        &mut config.facebook.app_secret,
        &mut config.storage.signing_secret,
        &mut config.storage.gcs.secret_key,
    ] {
        if !secret.is_empty() {
            *secret = "****".to_string();
        }
    }
    config
}

/// Mask the password in a connection URL
fn mask_password(url: &str) -> String {
    if let Some(at_pos) = url.find('@') {
        if let Some(colon_pos) = url[..at_pos].rfind(':') {
            let scheme_end = url.find("://").map(|i| i + 3).unwrap_or(0);
            if colon_pos > scheme_end {
                let mut masked = url[..colon_pos + 1].to_string();
                masked.push_str("****");
                masked.push_str(&url[at_pos..]);
                return masked;
            }
        }
    }
    url.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_password() {
        assert_eq!(
            mask_password("postgres://quest:s3cret@db:5432/questhub"),
            "postgres://quest:****@db:5432/questhub"
        );
        assert_eq!(
            mask_password("redis://127.0.0.1:6379"),
            "redis://127.0.0.1:6379"
        );
    }
}
