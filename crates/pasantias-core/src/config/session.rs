//! Authenticated session configuration.

use serde::{Deserialize, Serialize};

/// Credentials of the session the binaries act on behalf of.
///
/// Token issuance happens elsewhere; the client only carries the
/// bearer token it is given.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Bearer token attached to every request.
    #[serde(default)]
    pub token: Option<String>,
    /// The authenticated user's id.
    #[serde(default)]
    pub user_id: i64,
    /// The authenticated user's role: `admin`, `organization`, or `student`.
    #[serde(default = "default_role")]
    pub role: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            token: None,
            user_id: 0,
            role: default_role(),
        }
    }
}

fn default_role() -> String {
    "student".to_string()
}
