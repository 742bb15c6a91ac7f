//! Partner listings.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use questhub_core::error::AppError;
use questhub_core::types::{PageRequest, canonical_province};
use questhub_database::repositories::partner::PartnerFilter;
use questhub_entity::partner::Partner;
use questhub_service::RequestContext;

use super::Cli;
use crate::output;

/// Arguments for partner commands
#[derive(Debug, Args)]
pub struct PartnerArgs {
    #[command(subcommand)]
    pub command: PartnerCommand,
}

/// Partner subcommands
#[derive(Debug, Subcommand)]
pub enum PartnerCommand {
    /// List partner applications and approved partners
    List {
        /// Filter by review status (pending, approved, rejected, suspended)
        #[arg(short, long)]
        status: Option<String>,
        /// Filter by province
        #[arg(short, long)]
        province: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: u64,
        #[arg(long, default_value_t = 50)]
        page_size: u64,
    },
}

#[derive(Debug, Serialize, Tabled)]
struct PartnerRow {
    id: String,
    name: String,
    province: String,
    status: String,
    referral_code: String,
    commission: String,
}

impl From<Partner> for PartnerRow {
    fn from(p: Partner) -> Self {
        Self {
            id: p.id.to_string(),
            name: p.full_name,
            province: p.province,
            status: p.status.to_string(),
            referral_code: p.referral_code.unwrap_or_default(),
            commission: format!("{:.2}%", f64::from(p.commission_bps) / 100.0),
        }
    }
}

/// Execute partner commands
pub async fn execute(args: &PartnerArgs, cli: &Cli) -> Result<(), AppError> {
    match &args.command {
        PartnerCommand::List {
            status,
            province,
            page,
            page_size,
        } => {
            let province = match province.as_deref() {
                Some(p) => Some(
                    canonical_province(p)
                        .ok_or_else(|| AppError::validation(format!("Unknown province: {p}")))?
                        .to_string(),
                ),
                None => None,
            };
            let filter = PartnerFilter {
                status: status.as_deref().map(str::parse).transpose()?,
                province,
                search: None,
            };

            let state = super::build_state(cli).await?;
            let result = state
                .partner_service
                .list(
                    &RequestContext::system(),
                    filter,
                    PageRequest::new(*page, *page_size),
                )
                .await?;
            let rows: Vec<PartnerRow> = result.items.into_iter().map(PartnerRow::from).collect();
            output::print_list(&rows, cli.format);
        }
    }

    Ok(())
}
