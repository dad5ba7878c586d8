//! Offer CLI commands.

use chrono::NaiveDate;
use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use pasantias_core::error::AppError;
use pasantias_core::types::{OfferId, Shift};
use pasantias_entity::offer::{CreateOffer, Offer};
use pasantias_entity::user::UserRole;
use pasantias_service::Session;

use super::ListArgs;

/// Arguments for offer commands
#[derive(Debug, Args)]
pub struct OffersArgs {
    /// Offer subcommand
    #[command(subcommand)]
    pub command: OfferCommand,
}

/// Offer subcommands
#[derive(Debug, Subcommand)]
pub enum OfferCommand {
    /// List offers visible to the session's role
    List(ListArgs),
    /// Show one offer
    Show {
        /// Offer ID
        id: i64,
    },
    /// Create a draft offer (organization)
    Create {
        /// Title
        #[arg(long)]
        title: Option<String>,
        /// Description
        #[arg(long)]
        description: Option<String>,
        /// Requirements for applicants
        #[arg(long)]
        requirements: Option<String>,
        /// Application deadline (YYYY-MM-DD)
        #[arg(long)]
        deadline: Option<NaiveDate>,
        /// Number of places
        #[arg(long, default_value_t = 1)]
        quota: u32,
        /// Hours per week
        #[arg(long, default_value_t = 20)]
        weekly_hours: u32,
        /// Work shift: morning, afternoon or mixed
        #[arg(long, default_value = "morning")]
        shift: String,
        /// Monthly stipend
        #[arg(long)]
        salary: Option<f64>,
    },
    /// Send a draft for review (organization)
    Submit {
        /// Offer ID
        id: i64,
    },
    /// Send a rejected offer back for review (organization)
    Resubmit {
        /// Offer ID
        id: i64,
    },
    /// Close an approved offer (organization)
    Close {
        /// Offer ID
        id: i64,
    },
    /// Approve a pending offer (admin)
    Approve {
        /// Offer ID
        id: i64,
    },
    /// Reject a pending offer (admin)
    Reject {
        /// Offer ID
        id: i64,
        /// Reason shown to the organization
        #[arg(short, long)]
        reason: Option<String>,
    },
    /// Apply to an approved offer (student)
    Apply {
        /// Offer ID
        id: i64,
        /// Optional cover letter
        #[arg(long)]
        cover_letter: Option<String>,
    },
}

/// Offer display row for table output
#[derive(Debug, Serialize, Tabled)]
struct OfferRow {
    /// Offer ID
    id: i64,
    /// Title
    title: String,
    /// Status
    status: String,
    /// Shift
    shift: String,
    /// Places
    quota: u32,
    /// Application deadline
    deadline: String,
    /// Rejection reason
    reason: String,
}

impl From<&Offer> for OfferRow {
    fn from(offer: &Offer) -> Self {
        Self {
            id: offer.id.get(),
            title: offer.title.clone(),
            status: offer.status.to_string(),
            shift: offer.shift.to_string(),
            quota: offer.quota,
            deadline: offer.application_deadline.to_string(),
            reason: output::or_dash(offer.rejection_reason.as_deref()),
        }
    }
}

/// Execute offer commands
pub async fn execute(
    args: &OffersArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let session = super::open_session(config_path).await?;

    match &args.command {
        OfferCommand::List(list) => {
            let snapshot = match session.context().role {
                UserRole::Admin => super::load_list(&*session.admin_offers()?, list).await?,
                UserRole::Organization => {
                    super::load_list(&*session.organization_offers()?, list).await?
                }
                UserRole::Student => super::load_list(&*session.student_offers()?, list).await?,
            };
            let rows: Vec<OfferRow> = snapshot.items.iter().map(OfferRow::from).collect();
            output::print_list(&rows, format);
            output::print_page(snapshot.page, snapshot.total_pages, snapshot.total, format);
        }
        OfferCommand::Show { id } => {
            let offer = show(&session, OfferId(*id)).await?;
            output::print_item(&offer, format);
        }
        OfferCommand::Create {
            title,
            description,
            requirements,
            deadline,
            quota,
            weekly_hours,
            shift,
            salary,
        } => {
            let view = session.organization_offers()?;
            let input = CreateOffer {
                title: text_or_prompt(title, "Title")?,
                description: text_or_prompt(description, "Description")?,
                requirements: text_or_prompt(requirements, "Requirements")?,
                salary: *salary,
                quota: *quota,
                weekly_hours: *weekly_hours,
                shift: shift.parse::<Shift>()?,
                application_deadline: match deadline {
                    Some(d) => *d,
                    None => dialoguer::Input::<NaiveDate>::new()
                        .with_prompt("Application deadline (YYYY-MM-DD)")
                        .interact_text()
                        .map_err(|e| AppError::internal(format!("Input error: {e}")))?,
                },
                position_id: None,
                modality_id: None,
                location_id: None,
                duration_id: None,
                technologies: Default::default(),
            };
            let offer = view.create_draft(input).await?;
            output::print_success(&format!("Draft offer #{} created", offer.id));
        }
        OfferCommand::Submit { id } => {
            let view = session.organization_offers()?;
            view.refresh_item(OfferId(*id)).await?;
            let offer = view.submit(OfferId(*id)).await?;
            output::print_success(&format!("Offer #{} is now {}", offer.id, offer.status));
        }
        OfferCommand::Resubmit { id } => {
            let view = session.organization_offers()?;
            view.refresh_item(OfferId(*id)).await?;
            let offer = view.resubmit(OfferId(*id)).await?;
            output::print_success(&format!("Offer #{} is now {}", offer.id, offer.status));
        }
        OfferCommand::Close { id } => {
            let view = session.organization_offers()?;
            view.refresh_item(OfferId(*id)).await?;
            let offer = view.close(OfferId(*id)).await?;
            output::print_success(&format!("Offer #{} closed", offer.id));
        }
        OfferCommand::Approve { id } => {
            let view = session.admin_offers()?;
            view.refresh_item(OfferId(*id)).await?;
            let offer = view.approve(OfferId(*id)).await?;
            output::print_success(&format!("Offer #{} approved", offer.id));
        }
        OfferCommand::Reject { id, reason } => {
            let view = session.admin_offers()?;
            view.refresh_item(OfferId(*id)).await?;
            let reason = super::reason_or_prompt(reason)?;
            let offer = view.reject(OfferId(*id), &reason).await?;
            output::print_success(&format!("Offer #{} rejected", offer.id));
        }
        OfferCommand::Apply { id, cover_letter } => {
            let view = session.student_offers()?;
            view.sync_applied().await?;
            view.refresh_item(OfferId(*id)).await?;
            let application = view.apply(OfferId(*id), cover_letter.clone()).await?;
            output::print_success(&format!(
                "Application #{} sent for offer #{}",
                application.id, id
            ));
        }
    }

    Ok(())
}

async fn show(session: &Session, id: OfferId) -> Result<Offer, AppError> {
    match session.context().role {
        UserRole::Admin => session.admin_offers()?.refresh_item(id).await,
        UserRole::Organization => session.organization_offers()?.refresh_item(id).await,
        UserRole::Student => session.student_offers()?.refresh_item(id).await,
    }
}

fn text_or_prompt(value: &Option<String>, prompt: &str) -> Result<String, AppError> {
    match value {
        Some(v) => Ok(v.clone()),
        None => dialoguer::Input::new()
            .with_prompt(prompt)
            .interact_text()
            .map_err(|e| AppError::internal(format!("Input error: {e}"))),
    }
}
