//! Application CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use pasantias_core::error::AppError;
use pasantias_core::types::ApplicationId;
use pasantias_entity::application::Application;
use pasantias_entity::user::UserRole;
use pasantias_service::Session;

use super::ListArgs;

/// Arguments for application commands
#[derive(Debug, Args)]
pub struct ApplicationsArgs {
    /// Application subcommand
    #[command(subcommand)]
    pub command: ApplicationCommand,
}

/// Application subcommands
#[derive(Debug, Subcommand)]
pub enum ApplicationCommand {
    /// List applications visible to the session's role
    List(ListArgs),
    /// Show one application
    Show {
        /// Application ID
        id: i64,
    },
    /// Forward a pending application to the organization (admin)
    Approve {
        /// Application ID
        id: i64,
    },
    /// Accept a pre-screened application (organization)
    Accept {
        /// Application ID
        id: i64,
    },
    /// Reject an application (admin for pending, organization for approved)
    Reject {
        /// Application ID
        id: i64,
        /// Reason shown to the student
        #[arg(short, long)]
        reason: Option<String>,
    },
    /// Close an accepted application (admin)
    Finalize {
        /// Application ID
        id: i64,
    },
    /// Withdraw one of your applications (student)
    Cancel {
        /// Application ID
        id: i64,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Application display row for table output
#[derive(Debug, Serialize, Tabled)]
struct ApplicationRow {
    /// Application ID
    id: i64,
    /// Offer
    offer: String,
    /// Student
    student: String,
    /// Status
    status: String,
    /// Applied at
    applied_at: String,
    /// Rejection reason
    reason: String,
}

impl From<&Application> for ApplicationRow {
    fn from(a: &Application) -> Self {
        Self {
            id: a.id.get(),
            offer: a
                .offer_title
                .clone()
                .unwrap_or_else(|| format!("#{}", a.offer_id)),
            student: a
                .student_name
                .clone()
                .unwrap_or_else(|| format!("#{}", a.student_id)),
            status: a.status.to_string(),
            applied_at: a.applied_at.format("%Y-%m-%d %H:%M").to_string(),
            reason: output::or_dash(a.rejection_reason.as_deref()),
        }
    }
}

/// Execute application commands
pub async fn execute(
    args: &ApplicationsArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let session = super::open_session(config_path).await?;

    match &args.command {
        ApplicationCommand::List(list) => {
            let snapshot = match session.context().role {
                UserRole::Admin => {
                    super::load_list(&*session.admin_applications()?, list).await?
                }
                UserRole::Organization => {
                    super::load_list(&*session.organization_applications()?, list).await?
                }
                UserRole::Student => {
                    super::load_list(&*session.student_applications()?, list).await?
                }
            };
            let rows: Vec<ApplicationRow> =
                snapshot.items.iter().map(ApplicationRow::from).collect();
            output::print_list(&rows, format);
            output::print_page(snapshot.page, snapshot.total_pages, snapshot.total, format);
        }
        ApplicationCommand::Show { id } => {
            let application = show(&session, ApplicationId(*id)).await?;
            output::print_item(&application, format);
        }
        ApplicationCommand::Approve { id } => {
            let view = session.admin_applications()?;
            view.refresh_item(ApplicationId(*id)).await?;
            let application = view.approve(ApplicationId(*id)).await?;
            output::print_success(&format!(
                "Application #{} forwarded to the organization",
                application.id
            ));
        }
        ApplicationCommand::Accept { id } => {
            let view = session.organization_applications()?;
            view.refresh_item(ApplicationId(*id)).await?;
            let application = view.accept(ApplicationId(*id)).await?;
            output::print_success(&format!("Application #{} accepted", application.id));
        }
        ApplicationCommand::Reject { id, reason } => {
            let id = ApplicationId(*id);
            let application = match session.context().role {
                UserRole::Admin => {
                    let view = session.admin_applications()?;
                    view.refresh_item(id).await?;
                    view.reject(id, &super::reason_or_prompt(reason)?).await?
                }
                UserRole::Organization => {
                    let view = session.organization_applications()?;
                    view.refresh_item(id).await?;
                    view.reject(id, &super::reason_or_prompt(reason)?).await?
                }
                UserRole::Student => {
                    return Err(AppError::authorization(
                        "Students cannot reject applications; use `applications cancel`",
                    ));
                }
            };
            output::print_success(&format!("Application #{} rejected", application.id));
        }
        ApplicationCommand::Finalize { id } => {
            let view = session.admin_applications()?;
            view.refresh_item(ApplicationId(*id)).await?;
            let application = view.finalize(ApplicationId(*id)).await?;
            output::print_success(&format!("Application #{} finalized", application.id));
        }
        ApplicationCommand::Cancel { id, yes } => {
            let view = session.student_applications()?;
            view.refresh_item(ApplicationId(*id)).await?;

            if !yes {
                let confirmed = dialoguer::Confirm::new()
                    .with_prompt(format!("Withdraw application #{id}?"))
                    .default(false)
                    .interact()
                    .map_err(|e| AppError::internal(format!("Input error: {e}")))?;
                if !confirmed {
                    output::print_warning("Cancelled by user");
                    return Ok(());
                }
            }

            view.cancel(ApplicationId(*id)).await?;
            output::print_success(&format!("Application #{id} withdrawn"));
        }
    }

    Ok(())
}

async fn show(session: &Session, id: ApplicationId) -> Result<Application, AppError> {
    match session.context().role {
        UserRole::Admin => session.admin_applications()?.refresh_item(id).await,
        UserRole::Organization => session.organization_applications()?.refresh_item(id).await,
        UserRole::Student => session.student_applications()?.refresh_item(id).await,
    }
}
