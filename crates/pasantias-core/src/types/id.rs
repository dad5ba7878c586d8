//! Newtype wrappers around server-assigned integer identifiers.
//!
//! Using distinct types prevents accidentally passing an `OfferId` where an
//! `ApplicationId` is expected.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Macro to define a newtype ID wrapper around `i64`.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            /// Return the raw integer value.
            pub fn get(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().trim_start_matches('#').parse::<i64>().map(Self)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> i64 {
                id.0
            }
        }
    };
}

define_id!(
    /// Identifier of an internship offer.
    OfferId
);

define_id!(
    /// Identifier of a student application.
    ApplicationId
);

define_id!(
    /// Identifier of a notification.
    NotificationId
);

define_id!(
    /// Identifier of a platform user.
    UserId
);

define_id!(
    /// Identifier of an organization.
    OrganizationId
);

define_id!(
    /// Identifier of a technology catalog entry.
    TechnologyId
);

define_id!(
    /// Identifier of a location catalog entry.
    LocationId
);

define_id!(
    /// Identifier of a modality catalog entry.
    ModalityId
);

define_id!(
    /// Identifier of a position catalog entry.
    PositionId
);

define_id!(
    /// Identifier of a duration catalog entry.
    DurationId
);
