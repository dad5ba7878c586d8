//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod api;
pub mod logging;
pub mod notification;
pub mod pagination;
pub mod session;

use serde::{Deserialize, Serialize};

use self::api::ApiConfig;
use self::logging::LoggingConfig;
use self::notification::NotificationConfig;
use self::pagination::PaginationConfig;
use self::session::SessionConfig;

use crate::error::AppError;

/// Environment variable prefix for overrides, e.g. `PASANTIAS__API__BASE_URL`.
pub const ENV_PREFIX: &str = "PASANTIAS";

/// Root application configuration.
///
/// Every section has defaults so that an empty file is a valid
/// configuration pointing at a local backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Backend connection settings.
    #[serde(default)]
    pub api: ApiConfig,
    /// Default page sizes per list view.
    #[serde(default)]
    pub pagination: PaginationConfig,
    /// Notification polling and toast settings.
    #[serde(default)]
    pub notifications: NotificationConfig,
    /// Authenticated session settings.
    #[serde(default)]
    pub session: SessionConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    ///
    /// Merges `config/default`, the given file (if present), and
    /// environment variables prefixed with `PASANTIAS__`.
    pub fn load(path: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let loaded: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        loaded.pagination.validate()?;
        Ok(loaded)
    }
}
