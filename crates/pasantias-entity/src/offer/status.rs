//! Offer status enumeration and adjacency table.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::status::StatusModel;
use crate::user::UserRole;

/// Publication status of an offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OfferStatus {
    /// Being written by the organization; invisible to everyone else.
    Draft,
    /// Submitted and waiting for an admin decision.
    Pending,
    /// Published and open to students.
    Approved,
    /// Refused by an admin; may be edited and resubmitted.
    Rejected,
    /// Withdrawn by the organization. Terminal.
    Closed,
}

impl OfferStatus {
    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Closed => "closed",
        }
    }
}

impl StatusModel for OfferStatus {
    fn all() -> &'static [Self] {
        &[
            Self::Draft,
            Self::Pending,
            Self::Approved,
            Self::Rejected,
            Self::Closed,
        ]
    }

    fn allowed_next(&self) -> &'static [Self] {
        match self {
            Self::Draft => &[Self::Pending],
            Self::Pending => &[Self::Approved, Self::Rejected],
            Self::Approved => &[Self::Closed],
            Self::Rejected => &[Self::Pending],
            Self::Closed => &[],
        }
    }

    fn actor_for(&self, to: Self) -> Option<UserRole> {
        match (self, to) {
            (Self::Draft | Self::Rejected, Self::Pending) => Some(UserRole::Organization),
            (Self::Pending, Self::Approved | Self::Rejected) => Some(UserRole::Admin),
            (Self::Approved, Self::Closed) => Some(UserRole::Organization),
            _ => None,
        }
    }

    fn action_verb(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Pending => "submit",
            Self::Approved => "approve",
            Self::Rejected => "reject",
            Self::Closed => "close",
        }
    }

    fn requires_reason(&self) -> bool {
        matches!(self, Self::Rejected)
    }
}

impl fmt::Display for OfferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OfferStatus {
    type Err = pasantias_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "draft" => Ok(Self::Draft),
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            "closed" => Ok(Self::Closed),
            _ => Err(pasantias_core::AppError::validation(format!(
                "Invalid offer status: '{s}'. Expected one of: draft, pending, approved, rejected, closed"
            ))),
        }
    }
}
