//! Authenticated context of the session.

use serde::{Deserialize, Serialize};

use pasantias_core::AppError;
use pasantias_core::types::UserId;
use pasantias_entity::user::UserRole;

/// Who is acting.
///
/// Passed into every orchestrator so that role-owned transitions can be
/// refused before any request is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContext {
    /// The authenticated user's ID.
    pub user_id: UserId,
    /// The user's role.
    pub role: UserRole,
}

impl SessionContext {
    /// Creates a new session context.
    pub fn new(user_id: UserId, role: UserRole) -> Self {
        Self { user_id, role }
    }

    /// Returns whether the current user is an admin.
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Fails with an authorization error unless the user has `role`.
    pub fn require_role(&self, role: UserRole) -> Result<(), AppError> {
        if self.role == role {
            Ok(())
        } else {
            Err(AppError::authorization(format!(
                "This view requires the {role} role, the session is {}",
                self.role
            )))
        }
    }
}
