//! Request and response bodies of the REST backend.
//!
//! The client speaks one convention internally: a decision plus an
//! optional `rejection_reason`. The evaluate endpoint alone expects
//! capitalized `Decision` and `Reason`; that mapping lives only in
//! [`EvaluateApplicationRequest`].

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use pasantias_core::AppError;
use pasantias_core::error::ErrorKind;
use pasantias_core::result::AppResult;
use pasantias_core::types::unwrap_data;
use pasantias_entity::application::ApplicationStatus;
use pasantias_entity::lifecycle::StatusUpdate;
use pasantias_entity::offer::OfferStatus;

/// Body of `PUT /offers/{id}/decision`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OfferDecisionRequest {
    /// `approved` or `rejected`.
    pub decision: OfferStatus,
    /// Present only for rejections.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
}

/// Body of `PUT /applications/{id}/review`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewApplicationRequest {
    /// `approved` or `rejected`.
    pub decision: ApplicationStatus,
    /// Present only for rejections.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
}

/// Body of `PUT /applications/{id}/evaluate`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluateApplicationRequest {
    /// `accepted` or `rejected`.
    #[serde(rename = "Decision")]
    pub decision: ApplicationStatus,
    /// Present only for rejections.
    #[serde(rename = "Reason", skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
}

/// Reply of `GET /notifications/unread-count`.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct UnreadCount {
    /// Unread notifications of the current user.
    #[serde(alias = "unread_count", alias = "unreadCount", alias = "total")]
    pub count: u64,
}

impl UnreadCount {
    /// Decode a bare number, `{count}` or a `data`-wrapped form.
    pub fn parse(raw: Value) -> AppResult<u64> {
        match unwrap_data(raw) {
            Value::Number(n) => n.as_u64().ok_or_else(|| {
                AppError::new(ErrorKind::Serialization, "Unread count is not a natural number")
            }),
            other => Ok(serde_json::from_value::<Self>(other)?.count),
        }
    }
}

fn trimmed(reason: Option<&str>) -> Option<String> {
    reason
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(str::to_string)
}

impl OfferDecisionRequest {
    /// Build a decision body; the reason is sent only for rejections.
    pub fn new(decision: OfferStatus, reason: Option<&str>) -> Self {
        Self {
            decision,
            rejection_reason: (decision == OfferStatus::Rejected)
                .then(|| trimmed(reason))
                .flatten(),
        }
    }
}

impl ReviewApplicationRequest {
    /// Build a review body; the reason is sent only for rejections.
    pub fn new(decision: ApplicationStatus, reason: Option<&str>) -> Self {
        Self {
            decision,
            rejection_reason: (decision == ApplicationStatus::Rejected)
                .then(|| trimmed(reason))
                .flatten(),
        }
    }
}

impl EvaluateApplicationRequest {
    /// Build an evaluation body; the reason is sent only for rejections.
    pub fn new(decision: ApplicationStatus, reason: Option<&str>) -> Self {
        Self {
            decision,
            rejection_reason: (decision == ApplicationStatus::Rejected)
                .then(|| trimmed(reason))
                .flatten(),
        }
    }
}

/// Entity keys a transition reply may nest the updated entity under.
const ENTITY_KEYS: &[&str] = &["offer", "application"];

/// Decode a transition reply into a [`StatusUpdate`].
///
/// Replies range from a full entity to a bare acknowledgement. When no
/// status can be found the confirmed target status is used.
pub fn parse_status_update<S: DeserializeOwned>(
    raw: Value,
    confirmed: S,
) -> AppResult<StatusUpdate<S>> {
    let mut value = unwrap_data(raw);
    if let Value::Object(map) = &mut value {
        if let Some(nested) = ENTITY_KEYS.iter().find_map(|key| map.remove(*key)) {
            value = unwrap_data(nested);
        }
    }
    match value {
        Value::Object(ref map) if map.contains_key("status") => {
            Ok(serde_json::from_value(value)?)
        }
        _ => Ok(StatusUpdate::status_only(confirmed)),
    }
}
