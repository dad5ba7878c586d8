//! The contract between lifecycle entities and the list orchestrator.

use std::fmt;
use std::hash::Hash;

use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use pasantias_core::events::EntityKind;

use crate::status::StatusModel;

/// An entity whose status is driven through a [`StatusModel`].
pub trait LifecycleEntity:
    Clone + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Typed identifier.
    type Id: Copy + Eq + Hash + fmt::Debug + fmt::Display + Into<i64> + Send + Sync + 'static;
    /// Status enum.
    type Status: StatusModel;

    /// Kind tag used in events and messages.
    const KIND: EntityKind;

    /// The entity's id.
    fn id(&self) -> Self::Id;

    /// The entity's current status.
    fn status(&self) -> Self::Status;

    /// Patch status, reason and timestamps from a confirmed update.
    ///
    /// `local_reason` is the reason the caller sent, used when the server
    /// does not echo it back. No other field may change.
    fn apply_update(&mut self, update: &StatusUpdate<Self::Status>, local_reason: Option<&str>);

    /// Label used in user-facing messages, e.g. `"offer #42"`.
    fn label(id: Self::Id) -> String {
        format!("{} #{}", Self::KIND, id)
    }
}

/// The subset of an entity returned by a transition endpoint.
///
/// Transition endpoints may answer with a full entity or only a few
/// fields; everything but `status` is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusUpdate<S> {
    /// Echoed id.
    #[serde(default)]
    pub id: Option<i64>,
    /// New status.
    pub status: S,
    /// Reason attached to a rejection.
    #[serde(default)]
    pub rejection_reason: Option<String>,
    /// Publication date assigned on approval (offers).
    #[serde(default)]
    pub published_start_date: Option<NaiveDate>,
    /// Admin decision time (applications).
    #[serde(default)]
    pub admin_reviewed_at: Option<DateTime<Utc>>,
    /// Organization decision time (applications).
    #[serde(default)]
    pub org_evaluated_at: Option<DateTime<Utc>>,
    /// Server modification time.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl<S> StatusUpdate<S> {
    /// An update carrying only a status.
    pub fn status_only(status: S) -> Self {
        Self {
            id: None,
            status,
            rejection_reason: None,
            published_start_date: None,
            admin_reviewed_at: None,
            org_evaluated_at: None,
            updated_at: None,
        }
    }
}

/// Resolve the reason to store after a transition into `rejected`.
pub(crate) fn resolve_reason(
    server: Option<&String>,
    local: Option<&str>,
    previous: Option<String>,
) -> Option<String> {
    server
        .cloned()
        .or_else(|| local.map(|r| r.trim().to_string()))
        .or(previous)
}

/// Set a stage timestamp once, never earlier than the previous stage.
pub(crate) fn stamp_once(
    slot: &mut Option<DateTime<Utc>>,
    reported: Option<DateTime<Utc>>,
    floor: Option<DateTime<Utc>>,
) {
    if slot.is_some() {
        return;
    }
    let at = reported.unwrap_or_else(Utc::now);
    *slot = Some(match floor {
        Some(floor) if at < floor => floor,
        _ => at,
    });
}
