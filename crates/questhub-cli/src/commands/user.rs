//! User management CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;
use uuid::Uuid;

use questhub_core::error::AppError;
use questhub_core::types::PageRequest;
use questhub_database::repositories::user::UserFilter;
use questhub_entity::user::{User, UserStatus};
use questhub_service::RequestContext;

use super::Cli;
use crate::output;

/// Arguments for user commands
#[derive(Debug, Args)]
pub struct UserArgs {
    /// User subcommand
    #[command(subcommand)]
    pub command: UserCommand,
}

/// User subcommands
#[derive(Debug, Subcommand)]
pub enum UserCommand {
    /// List users
    List {
        /// Filter by role (user, partner, shop, rider, admin)
        #[arg(short, long)]
        role: Option<String>,
        /// Filter by status (active, inactive, locked)
        #[arg(short, long)]
        status: Option<String>,
        /// Match username, display name or email
        #[arg(long)]
        search: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: u64,
        #[arg(long, default_value_t = 50)]
        page_size: u64,
    },
    /// Re-enable an account
    Enable {
        /// User ID
        id: Uuid,
    },
    /// Disable an account and revoke its tokens
    Disable {
        /// User ID
        id: Uuid,
    },
}

/// User display row for table output
#[derive(Debug, Serialize, Tabled)]
struct UserRow {
    id: String,
    username: String,
    email: String,
    role: String,
    status: String,
    points: i64,
    created_at: String,
}

impl From<User> for UserRow {
    fn from(u: User) -> Self {
        Self {
            id: u.id.to_string(),
            username: u.username,
            email: u.email.unwrap_or_default(),
            role: u.role.to_string(),
            status: u.status.to_string(),
            points: u.points_balance,
            created_at: u.created_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

/// Execute user commands
pub async fn execute(args: &UserArgs, cli: &Cli) -> Result<(), AppError> {
    let state = super::build_state(cli).await?;
    let admins = &state.admin_user_service;

    match &args.command {
        UserCommand::List {
            role,
            status,
            search,
            page,
            page_size,
        } => {
            let filter = UserFilter {
                role: role.as_deref().map(str::parse).transpose()?,
                status: status.as_deref().map(str::parse).transpose()?,
                search: search.clone(),
            };
            let result = admins
                .list_users(
                    &RequestContext::system(),
                    filter,
                    PageRequest::new(*page, *page_size),
                )
                .await?;
            let total = result.total_items;
            let rows: Vec<UserRow> = result.items.into_iter().map(UserRow::from).collect();
            output::print_list(&rows, cli.format);
            println!("{} of {} user(s)", rows.len(), total);
        }
        UserCommand::Enable { id } => {
            let user = admins.set_status_unchecked(*id, UserStatus::Active).await?;
            output::print_success(&format!("User '{}' enabled", user.username));
        }
        UserCommand::Disable { id } => {
            let user = admins.set_status_unchecked(*id, UserStatus::Inactive).await?;
            output::print_success(&format!("User '{}' disabled", user.username));
        }
    }

    Ok(())
}
