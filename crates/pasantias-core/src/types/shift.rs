//! Work shift of an offer, shared by offers and offer filters.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Time of day an internship takes place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shift {
    /// Morning shift.
    Morning,
    /// Afternoon shift.
    Afternoon,
    /// Mixed schedule.
    Mixed,
}

impl Shift {
    /// Return the shift as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Morning => "morning",
            Self::Afternoon => "afternoon",
            Self::Mixed => "mixed",
        }
    }
}

impl fmt::Display for Shift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Shift {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "morning" => Ok(Self::Morning),
            "afternoon" => Ok(Self::Afternoon),
            "mixed" => Ok(Self::Mixed),
            _ => Err(AppError::validation(format!(
                "Invalid shift: '{s}'. Expected one of: morning, afternoon, mixed"
            ))),
        }
    }
}
