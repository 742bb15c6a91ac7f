//! Admin account bootstrap.

use clap::{Args, Subcommand};

use questhub_core::error::AppError;

use super::Cli;
use crate::output;

/// Arguments for admin commands
#[derive(Debug, Args)]
pub struct AdminArgs {
    /// Admin subcommand
    #[command(subcommand)]
    pub command: AdminCommand,
}

/// Admin subcommands
#[derive(Debug, Subcommand)]
pub enum AdminCommand {
    /// Create a new admin account
    Create {
        /// Username
        #[arg(short, long)]
        username: Option<String>,
        /// Email
        #[arg(short, long)]
        email: Option<String>,
        /// Password (will prompt if not provided)
        #[arg(short, long)]
        password: Option<String>,
    },
}

fn input_error(e: dialoguer::Error) -> AppError {
    AppError::internal(format!("Input error: {e}"))
}

/// Execute admin commands
pub async fn execute(args: &AdminArgs, cli: &Cli) -> Result<(), AppError> {
    match &args.command {
        AdminCommand::Create {
            username,
            email,
            password,
        } => {
            let username = match username {
                Some(u) => u.clone(),
                None => dialoguer::Input::new()
                    .with_prompt("Admin username")
                    .interact_text()
                    .map_err(input_error)?,
            };

            let email = match email {
                Some(e) => Some(e.clone()),
                None => {
                    let e: String = dialoguer::Input::new()
                        .with_prompt("Admin email (optional, press Enter to skip)")
                        .allow_empty(true)
                        .interact_text()
                        .map_err(input_error)?;
                    if e.trim().is_empty() { None } else { Some(e) }
                }
            };

            let password = match password {
                Some(p) => p.clone(),
                None => dialoguer::Password::new()
                    .with_prompt("Admin password")
                    .with_confirmation("Confirm password", "Passwords do not match")
                    .interact()
                    .map_err(input_error)?,
            };

            let state = super::build_state(cli).await?;
            let user = state
                .admin_user_service
                .create_admin(&username, email.as_deref(), &password)
                .await?;

            output::print_success(&format!(
                "Admin '{}' created (id: {})",
                user.username, user.id
            ));
        }
    }

    Ok(())
}
