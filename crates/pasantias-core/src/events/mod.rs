//! Domain events emitted by lifecycle operations.
//!
//! Events are broadcast by the list orchestrators after a backend call
//! succeeds and consumed by the notification side-channel.

pub mod lifecycle;

pub use lifecycle::{EntityKind, LifecycleAction, LifecycleEvent};
