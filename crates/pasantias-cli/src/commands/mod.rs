//! CLI command definitions and dispatch.

pub mod applications;
pub mod catalogs;
pub mod config;
pub mod notifications;
pub mod offers;

use std::str::FromStr;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use tracing::{debug, info};

use crate::output::{self, OutputFormat};
use pasantias_core::config::AppConfig;
use pasantias_core::error::AppError;
use pasantias_core::types::{
    DurationId, FilterPatch, LocationId, ModalityId, PositionId, Shift, TechnologyId,
};
use pasantias_entity::lifecycle::LifecycleEntity;
use pasantias_service::{ListOrchestrator, ListSnapshot, Session};

/// PasantiasUNI internship offer and application workflows
#[derive(Debug, Parser)]
#[command(name = "pasantias", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

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
    /// Internship offers
    Offers(offers::OffersArgs),
    /// Applications to offers
    Applications(applications::ApplicationsArgs),
    /// Notification feed
    Notifications(notifications::NotificationsArgs),
    /// Reference catalogs
    Catalogs(catalogs::CatalogsArgs),
    /// Configuration management
    Config(config::ConfigArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        match &self.command {
            Commands::Offers(args) => offers::execute(args, &self.config, self.format).await,
            Commands::Applications(args) => {
                applications::execute(args, &self.config, self.format).await
            }
            Commands::Notifications(args) => {
                notifications::execute(args, &self.config, self.format).await
            }
            Commands::Catalogs(args) => catalogs::execute(args, &self.config, self.format).await,
            Commands::Config(args) => config::execute(args, &self.config, self.format).await,
        }
    }
}

/// Filters shared by every list command
#[derive(Debug, Clone, Default, Args)]
pub struct ListArgs {
    /// Page to show
    #[arg(long, default_value_t = 1)]
    pub page: u32,
    /// Page size (5-100)
    #[arg(long)]
    pub limit: Option<u32>,
    /// Search term (at least 2 characters)
    #[arg(short, long)]
    pub search: Option<String>,
    /// Status filter
    #[arg(long)]
    pub status: Option<String>,
    /// Earliest date (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<NaiveDate>,
    /// Latest date (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<NaiveDate>,
    /// Technology id
    #[arg(long)]
    pub technology: Option<i64>,
    /// Modality id
    #[arg(long)]
    pub modality: Option<i64>,
    /// Location id
    #[arg(long)]
    pub location: Option<i64>,
    /// Position id
    #[arg(long)]
    pub position: Option<i64>,
    /// Duration id
    #[arg(long)]
    pub duration: Option<i64>,
    /// Work shift: morning, afternoon or mixed
    #[arg(long)]
    pub shift: Option<String>,
}

impl ListArgs {
    /// Translate the flags into filter patches. The page is handled apart.
    pub fn patches<S>(&self) -> Result<Vec<FilterPatch<S>>, AppError>
    where
        S: FromStr<Err = AppError>,
    {
        let mut patches = Vec::new();
        if let Some(limit) = self.limit {
            patches.push(FilterPatch::Limit(limit));
        }
        if self.search.is_some() {
            patches.push(FilterPatch::Search(self.search.clone()));
        }
        if let Some(status) = &self.status {
            patches.push(FilterPatch::Status(Some(status.parse()?)));
        }
        if self.from.is_some() {
            patches.push(FilterPatch::DateFrom(self.from));
        }
        if self.to.is_some() {
            patches.push(FilterPatch::DateTo(self.to));
        }
        if let Some(id) = self.technology {
            patches.push(FilterPatch::Technology(Some(TechnologyId(id))));
        }
        if let Some(id) = self.modality {
            patches.push(FilterPatch::Modality(Some(ModalityId(id))));
        }
        if let Some(id) = self.location {
            patches.push(FilterPatch::Location(Some(LocationId(id))));
        }
        if let Some(id) = self.position {
            patches.push(FilterPatch::Position(Some(PositionId(id))));
        }
        if let Some(id) = self.duration {
            patches.push(FilterPatch::Duration(Some(DurationId(id))));
        }
        if let Some(shift) = &self.shift {
            patches.push(FilterPatch::Shift(Some(shift.parse::<Shift>()?)));
        }
        Ok(patches)
    }
}

/// Helper: load configuration from file
pub async fn load_config(config_path: &str) -> Result<AppConfig, AppError> {
    debug!(path = config_path, "Loading configuration");
    AppConfig::load(config_path)
}

/// Helper: open a session from the configured credentials
pub async fn open_session(config_path: &str) -> Result<Session, AppError> {
    let config = load_config(config_path).await?;
    let base_url = config.api.base_url.clone();
    let session = Session::connect(config)?;
    info!(role = %session.context().role, base_url = %base_url, "Session opened");
    Ok(session)
}

/// Helper: load the filtered list, then move to the requested page
pub async fn load_list<E>(
    view: &ListOrchestrator<E>,
    args: &ListArgs,
) -> Result<ListSnapshot<E>, AppError>
where
    E: LifecycleEntity,
    E::Status: FromStr<Err = AppError>,
{
    view.load(args.patches()?).await?;
    debug!(kind = %E::KIND, page = args.page, "List loaded");
    if args.page > 1 && !view.go_to_page(args.page).await? {
        let snapshot = view.snapshot().await;
        output::print_warning(&format!(
            "Page {} is out of range (1-{})",
            args.page, snapshot.total_pages
        ));
    }
    Ok(view.snapshot().await)
}

/// Helper: prompt for a rejection reason when none was given
pub fn reason_or_prompt(reason: &Option<String>) -> Result<String, AppError> {
    match reason {
        Some(r) => Ok(r.clone()),
        None => dialoguer::Input::new()
            .with_prompt("Rejection reason (at least 10 characters)")
            .validate_with(|input: &String| -> Result<(), String> {
                pasantias_service::orchestrator::validate_reason(input).map_err(|e| e.message)
            })
            .interact_text()
            .map_err(|e| AppError::internal(format!("Input error: {e}"))),
    }
}
