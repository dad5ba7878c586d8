//! Catalog entry model and catalog kinds.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The reference catalogs offers point into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogKind {
    /// Technologies (Rust, SQL, ...).
    Technology,
    /// Locations.
    Location,
    /// Work modalities (on-site, remote, hybrid).
    Modality,
    /// Positions.
    Position,
    /// Internship durations.
    Duration,
}

impl CatalogKind {
    /// Every catalog kind.
    pub const ALL: [CatalogKind; 5] = [
        Self::Technology,
        Self::Location,
        Self::Modality,
        Self::Position,
        Self::Duration,
    ];

    /// Return the kind as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Technology => "technology",
            Self::Location => "location",
            Self::Modality => "modality",
            Self::Position => "position",
            Self::Duration => "duration",
        }
    }

    /// Path segment of the catalog endpoint.
    pub fn path_segment(&self) -> &'static str {
        match self {
            Self::Technology => "technologies",
            Self::Location => "locations",
            Self::Modality => "modalities",
            Self::Position => "positions",
            Self::Duration => "durations",
        }
    }
}

impl fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CatalogKind {
    type Err = pasantias_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == lower || kind.path_segment() == lower)
            .ok_or_else(|| {
                pasantias_core::AppError::validation(format!(
                    "Invalid catalog: '{s}'. Expected one of: technology, location, modality, position, duration"
                ))
            })
    }
}

/// A single catalog row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Catalog-local identifier.
    pub id: i64,
    /// Display name.
    pub name: String,
}
