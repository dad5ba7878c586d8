//! Unified application error types for the PasantiasUNI client.
//!
//! Every layer maps its failures into [`AppError`] so that orchestrators
//! can decide locally whether a failure is a pre-flight rejection, a
//! stale entity, a business-rule refusal, or a transient transport error.

use std::fmt;
use thiserror::Error;

/// Prefix prepended to backend business-rule refusals shown to users.
pub const CONFLICT_PREFIX: &str = "The request was declined";

/// Top-level error kind categorization used across the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// Local or server-side input validation failed.
    Validation,
    /// A status change is not present in the adjacency table.
    InvalidTransition,
    /// The target entity does not exist or was already mutated elsewhere.
    NotFound,
    /// A backend business rule refused the operation (quota, deadline, duplicate).
    Conflict,
    /// The session is not authenticated or the token expired.
    Authentication,
    /// The authenticated user may not perform the action.
    Authorization,
    /// The backend answered with a 5xx status.
    Server,
    /// The request never produced a response.
    Network,
    /// The request exceeded the configured timeout.
    Timeout,
    /// The operation was abandoned because its owner was torn down.
    Cancelled,
    /// A payload could not be (de)serialized.
    Serialization,
    /// Configuration could not be loaded.
    Configuration,
    /// An unexpected client-side failure.
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation => write!(f, "VALIDATION"),
            Self::InvalidTransition => write!(f, "INVALID_TRANSITION"),
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::Conflict => write!(f, "CONFLICT"),
            Self::Authentication => write!(f, "AUTHENTICATION"),
            Self::Authorization => write!(f, "AUTHORIZATION"),
            Self::Server => write!(f, "SERVER"),
            Self::Network => write!(f, "NETWORK"),
            Self::Timeout => write!(f, "TIMEOUT"),
            Self::Cancelled => write!(f, "CANCELLED"),
            Self::Serialization => write!(f, "SERIALIZATION"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Internal => write!(f, "INTERNAL"),
        }
    }
}

/// The unified application error used throughout the client.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create an invalid-transition error.
    pub fn invalid_transition(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidTransition, message)
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create a conflict error. The message is prefixed for display.
    pub fn conflict(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.starts_with(CONFLICT_PREFIX) {
            Self::new(ErrorKind::Conflict, message)
        } else {
            Self::new(ErrorKind::Conflict, format!("{CONFLICT_PREFIX}: {message}"))
        }
    }

    /// Create an authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Authentication, message)
    }

    /// Create an authorization error.
    pub fn authorization(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Authorization, message)
    }

    /// Create a server error.
    pub fn server(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Server, message)
    }

    /// Create a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Network, message)
    }

    /// Create a timeout error.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Timeout, message)
    }

    /// Create a cancellation error.
    pub fn cancelled(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Cancelled, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Map an HTTP status code and the server's message into an error.
    ///
    /// The server message is kept verbatim; only conflicts get a prefix.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            400 | 422 => Self::validation(message),
            401 => Self::authentication(message),
            403 => Self::authorization(message),
            404 => Self::not_found(message),
            409 => Self::conflict(message),
            500..=599 => Self::server(message),
            _ => Self::internal(format!("Unexpected status {status}: {message}")),
        }
    }

    /// Whether this error was raised before any request was sent.
    pub fn is_validation(&self) -> bool {
        matches!(self.kind, ErrorKind::Validation | ErrorKind::InvalidTransition)
    }

    /// Whether re-invoking the same action may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::Server | ErrorKind::Network | ErrorKind::Timeout
        )
    }

    /// Whether the error must escalate to session teardown.
    pub fn is_auth(&self) -> bool {
        matches!(self.kind, ErrorKind::Authentication)
    }

    /// Return a copy of this error whose message is prefixed with `context`.
    pub fn context(self, context: impl fmt::Display) -> Self {
        Self {
            kind: self.kind,
            message: format!("{context}: {}", self.message),
            source: self.source,
        }
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::with_source(ErrorKind::Validation, format!("Invalid input: {err}"), err)
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::with_source(ErrorKind::Timeout, "Request timed out", err)
        } else if err.is_decode() {
            Self::with_source(
                ErrorKind::Serialization,
                format!("Malformed response body: {err}"),
                err,
            )
        } else if let Some(status) = err.status() {
            Self::from_status(status.as_u16(), err.to_string())
        } else {
            Self::with_source(
                ErrorKind::Network,
                format!("Backend unreachable: {err}"),
                err,
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(AppError::from_status(404, "gone").kind, ErrorKind::NotFound);
        assert_eq!(AppError::from_status(409, "full").kind, ErrorKind::Conflict);
        assert_eq!(AppError::from_status(422, "bad").kind, ErrorKind::Validation);
        assert_eq!(AppError::from_status(503, "down").kind, ErrorKind::Server);
        assert_eq!(
            AppError::from_status(401, "expired").kind,
            ErrorKind::Authentication
        );
    }

    #[test]
    fn test_conflict_prefix_applied_once() {
        let err = AppError::conflict("Quota full");
        assert_eq!(err.message, "The request was declined: Quota full");
        let again = AppError::conflict(err.message.clone());
        assert_eq!(again.message, err.message);
    }

    #[test]
    fn test_classification() {
        assert!(AppError::invalid_transition("x").is_validation());
        assert!(AppError::network("x").is_retryable());
        assert!(!AppError::conflict("x").is_retryable());
        assert!(AppError::authentication("x").is_auth());
    }
}
