//! Offer entity model.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use pasantias_core::events::EntityKind;
use pasantias_core::types::{
    DurationId, LocationId, ModalityId, OfferId, OrganizationId, PositionId, Shift, TechnologyId,
};

use super::status::OfferStatus;
use crate::lifecycle::{LifecycleEntity, StatusUpdate, resolve_reason};

/// An internship offer published by an organization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Offer {
    /// Server-assigned identifier.
    pub id: OfferId,
    /// Owning organization.
    #[serde(default)]
    pub organization_id: OrganizationId,
    /// Offer title.
    #[serde(default)]
    pub title: String,
    /// Long description.
    #[serde(default)]
    pub description: String,
    /// Requirements for applicants.
    #[serde(default)]
    pub requirements: String,
    /// Monthly stipend, if any.
    #[serde(default)]
    pub salary: Option<f64>,
    /// Number of students the organization will take.
    #[serde(default = "default_quota")]
    pub quota: u32,
    /// Expected hours per week.
    #[serde(default)]
    pub weekly_hours: u32,
    /// Work shift.
    #[serde(default = "default_shift")]
    pub shift: Shift,
    /// Last day students may apply.
    #[serde(default = "today")]
    pub application_deadline: NaiveDate,
    /// Publication date, set when the offer is approved.
    #[serde(default)]
    pub published_start_date: Option<NaiveDate>,
    /// Publication status.
    pub status: OfferStatus,
    /// Present iff the status is `rejected`.
    #[serde(default)]
    pub rejection_reason: Option<String>,
    /// Position catalog reference.
    #[serde(default)]
    pub position_id: Option<PositionId>,
    /// Modality catalog reference.
    #[serde(default)]
    pub modality_id: Option<ModalityId>,
    /// Location catalog reference.
    #[serde(default)]
    pub location_id: Option<LocationId>,
    /// Duration catalog reference.
    #[serde(default)]
    pub duration_id: Option<DurationId>,
    /// Required technologies.
    #[serde(default)]
    pub technologies: BTreeSet<TechnologyId>,
    /// Creation time.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Last modification time.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Offer {
    /// A fresh draft with only the mandatory fields filled in.
    pub fn draft(
        id: OfferId,
        organization_id: OrganizationId,
        title: impl Into<String>,
        application_deadline: NaiveDate,
    ) -> Self {
        Self {
            id,
            organization_id,
            title: title.into(),
            description: String::new(),
            requirements: String::new(),
            salary: None,
            quota: default_quota(),
            weekly_hours: 0,
            shift: default_shift(),
            application_deadline,
            published_start_date: None,
            status: OfferStatus::Draft,
            rejection_reason: None,
            position_id: None,
            modality_id: None,
            location_id: None,
            duration_id: None,
            technologies: BTreeSet::new(),
            created_at: None,
            updated_at: None,
        }
    }

    /// Whether students may apply on `today`.
    pub fn accepts_applications(&self, today: NaiveDate) -> bool {
        self.status == OfferStatus::Approved && self.application_deadline >= today
    }

    /// Whether the organization may still edit the offer.
    pub fn is_editable(&self) -> bool {
        matches!(self.status, OfferStatus::Draft | OfferStatus::Rejected)
    }
}

impl LifecycleEntity for Offer {
    type Id = OfferId;
    type Status = OfferStatus;

    const KIND: EntityKind = EntityKind::Offer;

    fn id(&self) -> OfferId {
        self.id
    }

    fn status(&self) -> OfferStatus {
        self.status
    }

    fn apply_update(&mut self, update: &StatusUpdate<OfferStatus>, local_reason: Option<&str>) {
        let previous = self.status;
        self.status = update.status;

        self.rejection_reason = if update.status == OfferStatus::Rejected {
            resolve_reason(
                update.rejection_reason.as_ref(),
                local_reason,
                self.rejection_reason.take(),
            )
        } else {
            None
        };

        if update.status == OfferStatus::Approved && previous != OfferStatus::Approved {
            self.published_start_date = update
                .published_start_date
                .or_else(|| Some(Utc::now().date_naive()));
        }

        if update.updated_at.is_some() {
            self.updated_at = update.updated_at;
        }
    }
}

/// Body of `POST /offers`. New offers always start as drafts.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateOffer {
    /// Offer title.
    #[validate(length(min = 3, max = 150, message = "title must be 3-150 characters"))]
    pub title: String,
    /// Long description.
    #[validate(length(min = 10, message = "description needs at least 10 characters"))]
    pub description: String,
    /// Requirements for applicants.
    #[validate(length(min = 1, message = "requirements are required"))]
    pub requirements: String,
    /// Monthly stipend, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0, message = "salary cannot be negative"))]
    pub salary: Option<f64>,
    /// Number of places.
    #[validate(range(min = 1, message = "quota must be positive"))]
    pub quota: u32,
    /// Expected hours per week.
    #[validate(range(min = 1, max = 48, message = "weekly hours must be between 1 and 48"))]
    pub weekly_hours: u32,
    /// Work shift.
    pub shift: Shift,
    /// Last day students may apply.
    pub application_deadline: NaiveDate,
    /// Position catalog reference.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position_id: Option<PositionId>,
    /// Modality catalog reference.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modality_id: Option<ModalityId>,
    /// Location catalog reference.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_id: Option<LocationId>,
    /// Duration catalog reference.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_id: Option<DurationId>,
    /// Required technologies.
    #[serde(default)]
    pub technologies: BTreeSet<TechnologyId>,
}

fn default_quota() -> u32 {
    1
}

fn default_shift() -> Shift {
    Shift::Morning
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pending_offer() -> Offer {
        let mut offer = Offer::draft(
            OfferId(7),
            OrganizationId(1),
            "Backend intern",
            NaiveDate::from_ymd_opt(2030, 1, 31).unwrap(),
        );
        offer.status = OfferStatus::Pending;
        offer
    }

    #[test]
    fn test_minimal_json_deserializes() {
        let offer: Offer = serde_json::from_value(json!({ "id": 7, "status": "pending" })).unwrap();
        assert_eq!(offer.id, OfferId(7));
        assert_eq!(offer.status, OfferStatus::Pending);
        assert_eq!(offer.quota, 1);
    }

    #[test]
    fn test_approval_sets_publication_date_once() {
        let mut offer = pending_offer();
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        offer.apply_update(
            &StatusUpdate {
                published_start_date: Some(date),
                ..StatusUpdate::status_only(OfferStatus::Approved)
            },
            None,
        );
        assert_eq!(offer.status, OfferStatus::Approved);
        assert_eq!(offer.published_start_date, Some(date));
        assert_eq!(offer.rejection_reason, None);

        offer.apply_update(&StatusUpdate::status_only(OfferStatus::Closed), None);
        assert_eq!(offer.published_start_date, Some(date));
    }

    #[test]
    fn test_rejection_reason_follows_status() {
        let mut offer = pending_offer();
        offer.apply_update(
            &StatusUpdate::status_only(OfferStatus::Rejected),
            Some("  missing salary information  "),
        );
        assert_eq!(
            offer.rejection_reason.as_deref(),
            Some("missing salary information")
        );

        offer.apply_update(&StatusUpdate::status_only(OfferStatus::Pending), None);
        assert_eq!(offer.rejection_reason, None);
    }

    #[test]
    fn test_apply_update_keeps_other_fields() {
        let mut offer = pending_offer();
        let before = offer.clone();
        offer.apply_update(&StatusUpdate::status_only(OfferStatus::Approved), None);
        assert_eq!(offer.title, before.title);
        assert_eq!(offer.application_deadline, before.application_deadline);
        assert_eq!(offer.organization_id, before.organization_id);
    }

    #[test]
    fn test_create_offer_validation() {
        let mut request = CreateOffer {
            title: "Data engineering intern".to_string(),
            description: "Work with the analytics team".to_string(),
            requirements: "SQL".to_string(),
            salary: Some(500.0),
            quota: 2,
            weekly_hours: 20,
            shift: Shift::Afternoon,
            application_deadline: NaiveDate::from_ymd_opt(2030, 6, 1).unwrap(),
            position_id: None,
            modality_id: None,
            location_id: None,
            duration_id: None,
            technologies: BTreeSet::new(),
        };
        assert!(request.validate().is_ok());
        request.quota = 0;
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_accepts_applications() {
        let mut offer = pending_offer();
        let today = NaiveDate::from_ymd_opt(2029, 12, 1).unwrap();
        assert!(!offer.accepts_applications(today));
        offer.status = OfferStatus::Approved;
        assert!(offer.accepts_applications(today));
        assert!(!offer.accepts_applications(NaiveDate::from_ymd_opt(2030, 2, 1).unwrap()));
    }
}
