//! Manual runs of the shop request assignment sweep.

use clap::{Args, Subcommand};

use questhub_core::error::AppError;

use super::Cli;
use crate::output;

/// Arguments for assignment commands
#[derive(Debug, Args)]
pub struct AssignmentArgs {
    #[command(subcommand)]
    pub command: AssignmentCommand,
}

/// Assignment subcommands
#[derive(Debug, Subcommand)]
pub enum AssignmentCommand {
    /// Assign pending requests and reassign timed-out ones now
    Sweep,
}

/// Execute assignment commands
pub async fn execute(args: &AssignmentArgs, cli: &Cli) -> Result<(), AppError> {
    match &args.command {
        AssignmentCommand::Sweep => {
            let state = super::build_state(cli).await?;
            let report = state.shop_request_service.sweep().await?;
            output::print_item(
                &report,
                &[
                    ("Assigned", report.assigned.to_string()),
                    ("Reassigned", report.reassigned.to_string()),
                    ("Still pending", report.still_pending.to_string()),
                    ("Failed", report.failed.to_string()),
                ],
                cli.format,
            );
            if report.failed > 0 {
                output::print_warning("Some requests failed; see the log for details");
            }
        }
    }

    Ok(())
}
