//! Offer domain entities.

pub mod model;
pub mod status;

pub use model::{CreateOffer, Offer};
pub use status::OfferStatus;
