//! Application entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use pasantias_core::events::EntityKind;
use pasantias_core::types::{ApplicationId, OfferId, UserId};

use super::status::ApplicationStatus;
use crate::lifecycle::{LifecycleEntity, StatusUpdate, resolve_reason, stamp_once};

/// A student's application to an offer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    /// Server-assigned identifier.
    pub id: ApplicationId,
    /// Applying student.
    #[serde(default)]
    pub student_id: UserId,
    /// Target offer.
    #[serde(default)]
    pub offer_id: OfferId,
    /// Review status.
    pub status: ApplicationStatus,
    /// Required when the status is `rejected`.
    #[serde(default)]
    pub rejection_reason: Option<String>,
    /// Optional motivation text.
    #[serde(default)]
    pub cover_letter: Option<String>,
    /// Creation time.
    #[serde(default = "Utc::now")]
    pub applied_at: DateTime<Utc>,
    /// Admin pre-screen decision time.
    #[serde(default)]
    pub admin_reviewed_at: Option<DateTime<Utc>>,
    /// Organization evaluation time.
    #[serde(default)]
    pub org_evaluated_at: Option<DateTime<Utc>>,
    /// Offer title, when the backend embeds it.
    #[serde(default)]
    pub offer_title: Option<String>,
    /// Student display name, when the backend embeds it.
    #[serde(default)]
    pub student_name: Option<String>,
    /// Last modification time.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Application {
    /// A freshly submitted application.
    pub fn submitted(id: ApplicationId, student_id: UserId, offer_id: OfferId) -> Self {
        Self {
            id,
            student_id,
            offer_id,
            status: ApplicationStatus::Pending,
            rejection_reason: None,
            cover_letter: None,
            applied_at: Utc::now(),
            admin_reviewed_at: None,
            org_evaluated_at: None,
            offer_title: None,
            student_name: None,
            updated_at: None,
        }
    }
}

impl LifecycleEntity for Application {
    type Id = ApplicationId;
    type Status = ApplicationStatus;

    const KIND: EntityKind = EntityKind::Application;

    fn id(&self) -> ApplicationId {
        self.id
    }

    fn status(&self) -> ApplicationStatus {
        self.status
    }

    fn apply_update(
        &mut self,
        update: &StatusUpdate<ApplicationStatus>,
        local_reason: Option<&str>,
    ) {
        let previous = self.status;
        self.status = update.status;

        self.rejection_reason = if update.status == ApplicationStatus::Rejected {
            resolve_reason(
                update.rejection_reason.as_ref(),
                local_reason,
                self.rejection_reason.take(),
            )
        } else {
            None
        };

        match (previous, update.status) {
            (
                ApplicationStatus::Pending,
                ApplicationStatus::Approved | ApplicationStatus::Rejected,
            ) => stamp_once(
                &mut self.admin_reviewed_at,
                update.admin_reviewed_at,
                Some(self.applied_at),
            ),
            (
                ApplicationStatus::Approved,
                ApplicationStatus::Accepted | ApplicationStatus::Rejected,
            ) => {
                let floor = self.admin_reviewed_at.or(Some(self.applied_at));
                stamp_once(&mut self.org_evaluated_at, update.org_evaluated_at, floor);
            }
            _ => {}
        }

        if update.updated_at.is_some() {
            self.updated_at = update.updated_at;
        }
    }
}

/// Body of `POST /applications`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateApplication {
    /// Target offer.
    pub offer_id: OfferId,
    /// Optional motivation text.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 2000, message = "cover letter is limited to 2000 characters"))]
    pub cover_letter: Option<String>,
}
