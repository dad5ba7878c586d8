//! Application status enumeration and adjacency table.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::status::StatusModel;
use crate::user::UserRole;

/// Review status of an application.
///
/// Admins pre-screen, organizations evaluate, admins close the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    /// Submitted by the student, waiting for the admin pre-screen.
    Pending,
    /// Passed the pre-screen, waiting for the organization.
    Approved,
    /// Accepted by the organization.
    Accepted,
    /// Refused by an admin or the organization. Terminal.
    Rejected,
    /// Administratively closed after acceptance. Terminal.
    Finalized,
}

impl ApplicationStatus {
    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Finalized => "finalized",
        }
    }

    /// Whether the student may still withdraw the application.
    pub fn is_cancellable(&self) -> bool {
        matches!(self, Self::Pending | Self::Approved)
    }
}

impl StatusModel for ApplicationStatus {
    fn all() -> &'static [Self] {
        &[
            Self::Pending,
            Self::Approved,
            Self::Accepted,
            Self::Rejected,
            Self::Finalized,
        ]
    }

    fn allowed_next(&self) -> &'static [Self] {
        match self {
            Self::Pending => &[Self::Approved, Self::Rejected],
            Self::Approved => &[Self::Accepted, Self::Rejected],
            Self::Accepted => &[Self::Finalized],
            Self::Rejected => &[],
            Self::Finalized => &[],
        }
    }

    fn actor_for(&self, to: Self) -> Option<UserRole> {
        match (self, to) {
            (Self::Pending, Self::Approved | Self::Rejected) => Some(UserRole::Admin),
            (Self::Approved, Self::Accepted | Self::Rejected) => Some(UserRole::Organization),
            (Self::Accepted, Self::Finalized) => Some(UserRole::Admin),
            _ => None,
        }
    }

    fn action_verb(&self) -> &'static str {
        match self {
            Self::Pending => "resubmit",
            Self::Approved => "approve",
            Self::Accepted => "accept",
            Self::Rejected => "reject",
            Self::Finalized => "finalize",
        }
    }

    fn requires_reason(&self) -> bool {
        matches!(self, Self::Rejected)
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = pasantias_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            "finalized" => Ok(Self::Finalized),
            _ => Err(pasantias_core::AppError::validation(format!(
                "Invalid application status: '{s}'. Expected one of: pending, approved, accepted, rejected, finalized"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::is_valid_transition;

    #[test]
    fn test_adjacency_table() {
        let legal = [
            (ApplicationStatus::Pending, ApplicationStatus::Approved),
            (ApplicationStatus::Pending, ApplicationStatus::Rejected),
            (ApplicationStatus::Approved, ApplicationStatus::Accepted),
            (ApplicationStatus::Approved, ApplicationStatus::Rejected),
            (ApplicationStatus::Accepted, ApplicationStatus::Finalized),
        ];
        for from in ApplicationStatus::all() {
            for to in ApplicationStatus::all() {
                let expected = legal.contains(&(*from, *to));
                assert_eq!(is_valid_transition(*from, *to), expected, "{from} -> {to}");
            }
        }
    }

    #[test]
    fn test_rejection_is_owned_by_stage() {
        assert_eq!(
            ApplicationStatus::Pending.actor_for(ApplicationStatus::Rejected),
            Some(UserRole::Admin)
        );
        assert_eq!(
            ApplicationStatus::Approved.actor_for(ApplicationStatus::Rejected),
            Some(UserRole::Organization)
        );
    }

    #[test]
    fn test_cancellable_window() {
        assert!(ApplicationStatus::Pending.is_cancellable());
        assert!(ApplicationStatus::Approved.is_cancellable());
        assert!(!ApplicationStatus::Accepted.is_cancellable());
        assert!(!ApplicationStatus::Rejected.is_cancellable());
    }
}
