//! Convenience result type alias for the PasantiasUNI client.

use crate::error::AppError;

/// A specialized `Result` type for client operations.
pub type AppResult<T> = Result<T, AppError>;
