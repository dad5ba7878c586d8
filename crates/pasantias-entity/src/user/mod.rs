//! Platform user domain types.

pub mod role;

pub use role::UserRole;
