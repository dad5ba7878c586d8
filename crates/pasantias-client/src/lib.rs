//! # pasantias-client
//!
//! Backend traits consumed by the lifecycle services, and their REST
//! implementation on top of `reqwest`.

pub mod dto;
pub mod http;
pub mod token;
pub mod traits;

pub use http::{ApiClient, ApplicationsApi, CatalogsApi, NotificationsApi, OffersApi};
pub use token::TokenStore;
pub use traits::{
    ApplicationBackend, CatalogBackend, LifecycleBackend, NotificationBackend, OfferBackend,
};
