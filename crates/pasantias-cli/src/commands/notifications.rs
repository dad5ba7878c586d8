//! Notification CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use pasantias_core::error::AppError;
use pasantias_core::types::NotificationId;
use pasantias_entity::notification::Notification;

/// Arguments for notification commands
#[derive(Debug, Args)]
pub struct NotificationsArgs {
    /// Notification subcommand
    #[command(subcommand)]
    pub command: NotificationCommand,
}

/// Notification subcommands
#[derive(Debug, Subcommand)]
pub enum NotificationCommand {
    /// List recent notifications
    List {
        /// Only unread notifications
        #[arg(short, long)]
        unread: bool,
    },
    /// Show the unread count
    Count,
    /// Mark one notification as read
    Read {
        /// Notification ID
        id: i64,
    },
    /// Mark every notification as read
    ReadAll,
}

/// Notification display row for table output
#[derive(Debug, Serialize, Tabled)]
struct NotificationRow {
    /// Notification ID
    id: i64,
    /// Type
    kind: String,
    /// Title
    title: String,
    /// Message
    message: String,
    /// Read flag
    read: String,
    /// Created at
    created_at: String,
}

impl From<&Notification> for NotificationRow {
    fn from(n: &Notification) -> Self {
        Self {
            id: n.id.get(),
            kind: n.kind.to_string(),
            title: n.title.clone(),
            message: n.message.clone(),
            read: if n.is_read { "yes" } else { "no" }.to_string(),
            created_at: n.created_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

/// Execute notification commands
pub async fn execute(
    args: &NotificationsArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let session = super::open_session(config_path).await?;
    let store = session.notifications();

    match &args.command {
        NotificationCommand::List { unread } => {
            store.refresh().await?;
            let rows: Vec<NotificationRow> = store
                .items()
                .await
                .iter()
                .filter(|n| !unread || n.is_unread())
                .map(NotificationRow::from)
                .collect();
            output::print_list(&rows, format);
        }
        NotificationCommand::Count => {
            store.refresh().await?;
            let count = store.unread_count().await;
            match format {
                OutputFormat::Table => output::print_kv("Unread", &count.to_string()),
                OutputFormat::Json => output::print_item(&serde_json::json!({ "unread": count }), format),
            }
        }
        NotificationCommand::Read { id } => {
            store.refresh().await?;
            store.mark_as_read(NotificationId(*id)).await?;
            output::print_success(&format!("Notification #{id} marked as read"));
        }
        NotificationCommand::ReadAll => {
            store.mark_all_as_read().await?;
            output::print_success("All notifications marked as read");
        }
    }

    Ok(())
}
