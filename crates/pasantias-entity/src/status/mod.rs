//! Status model shared by offers and applications.
//!
//! A status model is an adjacency table: each status lists the statuses
//! it may move to, and each edge is owned by exactly one role. Nothing in
//! this module performs I/O; orchestrators use it as a pre-flight guard and
//! views use it to decide which actions to offer.

use std::fmt;
use std::hash::Hash;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::user::UserRole;

/// Legal transitions of a status enum.
pub trait StatusModel:
    Copy + Eq + Hash + fmt::Debug + fmt::Display + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Every status, in lifecycle order.
    fn all() -> &'static [Self];

    /// The statuses reachable in one step from `self`.
    fn allowed_next(&self) -> &'static [Self];

    /// The role entitled to move from `self` to `to`, if the edge exists.
    fn actor_for(&self, to: Self) -> Option<UserRole>;

    /// Imperative verb describing the move *into* this status ("approve").
    fn action_verb(&self) -> &'static str;

    /// Whether entering this status requires a reason.
    fn requires_reason(&self) -> bool;

    /// Whether `to` is in the allowed-next set of `self`.
    fn can_transition_to(&self, to: Self) -> bool {
        self.allowed_next().contains(&to)
    }

    /// Whether no transition leaves this status.
    fn is_terminal(&self) -> bool {
        self.allowed_next().is_empty()
    }

    /// The statuses `role` may move `self` to.
    fn actions_for(&self, role: UserRole) -> Vec<Self> {
        self.allowed_next()
            .iter()
            .copied()
            .filter(|to| self.actor_for(*to) == Some(role))
            .collect()
    }
}

/// Whether `to` is reachable from `from` in one step.
pub fn is_valid_transition<S: StatusModel>(from: S, to: S) -> bool {
    from.can_transition_to(to)
}
