//! Catalog CLI commands.

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use pasantias_core::error::AppError;
use pasantias_entity::catalog::CatalogKind;

/// Arguments for catalog commands
#[derive(Debug, Args)]
pub struct CatalogsArgs {
    /// Catalog to show: technologies, locations, modalities, positions or durations
    pub kind: String,
}

/// Catalog display row for table output
#[derive(Debug, Serialize, Tabled)]
struct CatalogRow {
    /// Entry ID
    id: i64,
    /// Display name
    name: String,
}

/// Execute catalog commands
pub async fn execute(
    args: &CatalogsArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let kind: CatalogKind = args.kind.parse()?;
    let session = super::open_session(config_path).await?;

    let entries = session.catalogs().get(kind).await?;
    let rows: Vec<CatalogRow> = entries
        .iter()
        .map(|entry| CatalogRow {
            id: entry.id,
            name: entry.name.clone(),
        })
        .collect();
    output::print_list(&rows, format);

    Ok(())
}
